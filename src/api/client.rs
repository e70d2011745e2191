// src/api/client.rs
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, Response};
use tracing::debug;

use crate::annotation::export::EvalRecord;
use crate::model::{BaselineImageSet, ComparisonPayload, Inspection, Transformer, WeatherCondition};

use super::error::{extract_message, ApiError};
use super::types::{
    BaselineDto, ComparisonDto, InspectionDto, NewInspection, NewTransformer, TransformerDto,
};

/// A file picked by the operator, read into memory for a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Attribution stamped onto every upload: the session operator plus the
/// moment of submission.
#[derive(Debug, Clone)]
pub struct UploadStamp {
    pub uploaded_by: String,
    pub date: String,
    pub time: String,
}

/// Synchronous client for the inspection backend. Lives on the API worker
/// thread; the UI never blocks on it.
pub struct Backend {
    http: Client,
    base_url: String,
}

impl Backend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn set_base_url(&mut self, base_url: impl Into<String>) {
        self.base_url = base_url.into();
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Map non-success statuses into `ApiError` with the backend's message.
    fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().unwrap_or_default();
            Err(ApiError::backend(status.as_u16(), &body))
        }
    }

    fn message_of(response: Response, fallback: &str) -> String {
        response
            .text()
            .ok()
            .and_then(|body| extract_message(&body))
            .unwrap_or_else(|| fallback.to_string())
    }

    // ------------------------------------------------------------------
    // Transformers
    // ------------------------------------------------------------------

    pub fn fetch_transformers(&self) -> Result<Vec<Transformer>, ApiError> {
        let url = self.url("/api/transformer/getAll");
        debug!(%url, "fetching transformers");
        let dtos: Vec<TransformerDto> = Self::check(self.http.get(url).send()?)?.json()?;
        Ok(dtos
            .into_iter()
            .filter_map(TransformerDto::into_transformer)
            .collect())
    }

    pub fn create_transformer(&self, req: &NewTransformer) -> Result<String, ApiError> {
        let response = Self::check(
            self.http
                .post(self.url("/api/transformer/create"))
                .json(req)
                .send()?,
        )?;
        Ok(Self::message_of(response, "Transformer successfully created."))
    }

    // ------------------------------------------------------------------
    // Inspections
    // ------------------------------------------------------------------

    pub fn fetch_inspections(&self, transformer_no: &str) -> Result<Vec<Inspection>, ApiError> {
        let url = self.url(&format!("/api/inspection/getAll/{transformer_no}"));
        let dtos: Vec<InspectionDto> = Self::check(self.http.get(url).send()?)?.json()?;
        Ok(dtos
            .into_iter()
            .filter_map(InspectionDto::into_inspection)
            .collect())
    }

    pub fn create_inspection(&self, req: &NewInspection) -> Result<String, ApiError> {
        let response = Self::check(
            self.http
                .post(self.url("/api/inspection/create"))
                .json(req)
                .send()?,
        )?;
        Ok(Self::message_of(response, "Inspection created."))
    }

    // ------------------------------------------------------------------
    // Baseline images
    // ------------------------------------------------------------------

    pub fn fetch_baseline(
        &self,
        transformer_no: &str,
    ) -> Result<Option<BaselineImageSet>, ApiError> {
        let url = self.url(&format!("/api/baseImage/get/{transformer_no}"));
        let response = self.http.get(url).send()?;
        if response.status().as_u16() == 404 {
            return Ok(None);
        }
        // A transformer without a baseline answers with a JSON null body.
        let dto: Option<BaselineDto> = Self::check(response)?.json()?;
        Ok(dto.map(|d| d.into_set(transformer_no)))
    }

    /// One multipart request carrying all three weather slots plus the
    /// session attribution.
    pub fn upload_baseline(
        &self,
        transformer_no: &str,
        slots: [UploadFile; 3],
        stamp: &UploadStamp,
    ) -> Result<String, ApiError> {
        let [sunny, cloudy, rainy] = slots;
        let form = Form::new()
            .part(WeatherCondition::Sunny.slot_field(), file_part(sunny)?)
            .part(WeatherCondition::Cloudy.slot_field(), file_part(cloudy)?)
            .part(WeatherCondition::Rainy.slot_field(), file_part(rainy)?)
            .text("uploadedBy", stamp.uploaded_by.clone())
            .text("uploadedDate", stamp.date.clone())
            .text("uploadedTime", stamp.time.clone());
        let response = Self::check(
            self.http
                .post(self.url(&format!("/api/baseImage/add/{transformer_no}")))
                .multipart(form)
                .send()?,
        )?;
        Ok(Self::message_of(response, "Baseline images uploaded."))
    }

    pub fn delete_baseline(&self, transformer_no: &str) -> Result<String, ApiError> {
        let response = Self::check(
            self.http
                .delete(self.url(&format!("/api/baseImage/delete/{transformer_no}")))
                .send()?,
        )?;
        Ok(Self::message_of(response, "Baseline images removed."))
    }

    // ------------------------------------------------------------------
    // Inspection images & evaluation
    // ------------------------------------------------------------------

    pub fn fetch_comparison(&self, inspection_no: &str) -> Result<ComparisonPayload, ApiError> {
        let url = self.url(&format!("/api/inspectionImage/get/{inspection_no}"));
        let dto: ComparisonDto = Self::check(self.http.get(url).send()?)?.json()?;
        Ok(dto.into_payload())
    }

    pub fn upload_thermal(
        &self,
        inspection_no: &str,
        transformer_no: &str,
        weather: WeatherCondition,
        file: UploadFile,
        stamp: &UploadStamp,
    ) -> Result<String, ApiError> {
        let form = Form::new()
            .part("thermalImage", file_part(file)?)
            .text("transformerNo", transformer_no.to_string())
            .text("imageCondition", weather.as_str())
            .text("uploadedBy", stamp.uploaded_by.clone())
            .text("uploadedDate", stamp.date.clone())
            .text("uploadedTime", stamp.time.clone());
        let response = Self::check(
            self.http
                .post(self.url(&format!("/api/inspectionImage/add/{inspection_no}")))
                .multipart(form)
                .send()?,
        )?;
        Ok(Self::message_of(response, "Thermal image uploaded."))
    }

    /// Post the full annotation set in one request; the backend replaces any
    /// previous evaluation wholesale.
    pub fn confirm_eval(&self, records: &[EvalRecord]) -> Result<String, ApiError> {
        let response = Self::check(
            self.http
                .post(self.url("/api/inspectionImage/createEvalResults"))
                .json(records)
                .send()?,
        )?;
        Ok(Self::message_of(response, "Evaluation saved."))
    }

    pub fn fetch_report(&self, inspection_no: &str) -> Result<Vec<u8>, ApiError> {
        let url = self.url(&format!("/api/inspectionImage/report/{inspection_no}"));
        let response = Self::check(self.http.get(url).send()?)?;
        let bytes = response.bytes()?;
        Ok(bytes.to_vec())
    }
}

fn file_part(file: UploadFile) -> Result<Part, ApiError> {
    Part::bytes(file.bytes)
        .file_name(file.file_name)
        .mime_str("application/octet-stream")
        .map_err(|e| ApiError::Decode(e.to_string()))
}
