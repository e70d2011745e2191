// src/api/mod.rs
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;

use eframe::egui;
use tracing::{info, warn};

use crate::annotation::export::EvalRecord;
use crate::model::{BaselineImageSet, ComparisonPayload, Inspection, Transformer, WeatherCondition};

pub mod client;
pub mod error;
pub mod types;

pub use client::{Backend, UploadFile, UploadStamp};
pub use error::ApiError;
pub use types::{Field, NewInspection, NewTransformer};

/// One backend call, fired and forgotten. There is no cancellation and no
/// de-duplication of concurrent loads; the newest answer wins on arrival.
#[derive(Debug)]
pub enum ApiRequest {
    FetchTransformers,
    CreateTransformer(NewTransformer),
    FetchInspections {
        transformer_no: String,
    },
    CreateInspection(NewInspection),
    FetchBaseline {
        transformer_no: String,
    },
    UploadBaseline {
        transformer_no: String,
        slots: Box<[UploadFile; 3]>,
        stamp: UploadStamp,
    },
    DeleteBaseline {
        transformer_no: String,
    },
    FetchComparison {
        inspection_no: String,
    },
    UploadThermal {
        inspection_no: String,
        transformer_no: String,
        weather: WeatherCondition,
        file: UploadFile,
        stamp: UploadStamp,
    },
    ConfirmEval {
        records: Vec<EvalRecord>,
    },
    FetchReport {
        inspection_no: String,
    },
    /// Settings changed; subsequent calls go to the new host.
    SetBaseUrl(String),
}

/// The worker's answer to one request, drained by the UI each frame.
#[derive(Debug)]
pub enum ApiEvent {
    Transformers(Result<Vec<Transformer>, ApiError>),
    TransformerCreated(Result<String, ApiError>),
    Inspections {
        transformer_no: String,
        result: Result<Vec<Inspection>, ApiError>,
    },
    InspectionCreated(Result<String, ApiError>),
    Baseline {
        transformer_no: String,
        result: Result<Option<BaselineImageSet>, ApiError>,
    },
    BaselineUploaded(Result<String, ApiError>),
    BaselineDeleted(Result<String, ApiError>),
    Comparison {
        inspection_no: String,
        result: Result<ComparisonPayload, ApiError>,
    },
    ThermalUploaded(Result<String, ApiError>),
    EvalConfirmed(Result<String, ApiError>),
    Report {
        inspection_no: String,
        result: Result<Vec<u8>, ApiError>,
    },
}

/// Handle owned by the UI thread. Sends requests to the worker and drains
/// whatever answers have arrived since the last frame.
pub struct ApiHandle {
    tx: Sender<ApiRequest>,
    rx: Receiver<ApiEvent>,
}

impl ApiHandle {
    /// Spawn the worker thread around a blocking HTTP client. The egui
    /// context is woken after every answer so responses render without
    /// waiting for the next input event.
    pub fn spawn(base_url: String, ctx: egui::Context) -> Self {
        let (req_tx, req_rx) = channel::<ApiRequest>();
        let (ev_tx, ev_rx) = channel::<ApiEvent>();

        thread::Builder::new()
            .name("api-worker".into())
            .spawn(move || {
                let mut backend = Backend::new(base_url);
                info!("api worker started");
                while let Ok(request) = req_rx.recv() {
                    if let ApiRequest::SetBaseUrl(url) = request {
                        backend.set_base_url(url);
                        continue;
                    }
                    let event = dispatch(&backend, request);
                    if ev_tx.send(event).is_err() {
                        break;
                    }
                    ctx.request_repaint();
                }
                info!("api worker stopped");
            })
            .expect("spawn api worker");

        Self {
            tx: req_tx,
            rx: ev_rx,
        }
    }

    pub fn send(&self, request: ApiRequest) {
        if self.tx.send(request).is_err() {
            warn!("api worker is gone; request dropped");
        }
    }

    pub fn drain(&self) -> Vec<ApiEvent> {
        self.rx.try_iter().collect()
    }
}

fn dispatch(backend: &Backend, request: ApiRequest) -> ApiEvent {
    match request {
        ApiRequest::FetchTransformers => ApiEvent::Transformers(backend.fetch_transformers()),
        ApiRequest::CreateTransformer(req) => {
            ApiEvent::TransformerCreated(backend.create_transformer(&req))
        }
        ApiRequest::FetchInspections { transformer_no } => ApiEvent::Inspections {
            result: backend.fetch_inspections(&transformer_no),
            transformer_no,
        },
        ApiRequest::CreateInspection(req) => {
            ApiEvent::InspectionCreated(backend.create_inspection(&req))
        }
        ApiRequest::FetchBaseline { transformer_no } => ApiEvent::Baseline {
            result: backend.fetch_baseline(&transformer_no),
            transformer_no,
        },
        ApiRequest::UploadBaseline {
            transformer_no,
            slots,
            stamp,
        } => ApiEvent::BaselineUploaded(backend.upload_baseline(&transformer_no, *slots, &stamp)),
        ApiRequest::DeleteBaseline { transformer_no } => {
            ApiEvent::BaselineDeleted(backend.delete_baseline(&transformer_no))
        }
        ApiRequest::FetchComparison { inspection_no } => ApiEvent::Comparison {
            result: backend.fetch_comparison(&inspection_no),
            inspection_no,
        },
        ApiRequest::UploadThermal {
            inspection_no,
            transformer_no,
            weather,
            file,
            stamp,
        } => ApiEvent::ThermalUploaded(backend.upload_thermal(
            &inspection_no,
            &transformer_no,
            weather,
            file,
            &stamp,
        )),
        ApiRequest::ConfirmEval { records } => ApiEvent::EvalConfirmed(backend.confirm_eval(&records)),
        ApiRequest::FetchReport { inspection_no } => ApiEvent::Report {
            result: backend.fetch_report(&inspection_no),
            inspection_no,
        },
        ApiRequest::SetBaseUrl(_) => unreachable!("handled in the worker loop"),
    }
}
