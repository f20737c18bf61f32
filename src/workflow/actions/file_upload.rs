use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    ErrorKind, Result,
    runtime::Context,
    workflow::{
        actions::{ActionType, lenient},
        edge::Links,
        input::{FileDescriptor, UserInput},
        output::NodeOutput,
    },
};

use super::{Action, ActionOutput, parse_params};

const DEFAULT_PROMPT: &str = "Upload a file:";
const DEFAULT_MAX_SIZE_MB: f64 = 10.0;
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Asks the participant for a file. Only the descriptor is handled; the
/// contents stay with the presentation layer.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FileUploadAction {
    #[serde(default, deserialize_with = "lenient::text")]
    prompt: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    label: Option<String>,
    /// mime types, `type/*` wildcards or `.ext` suffixes
    #[serde(default)]
    allowed_types: Option<Vec<String>>,
    /// editor shorthand used when `allowedTypes` is empty
    #[serde(default, deserialize_with = "lenient::text")]
    file_type: Option<String>,
    /// megabytes
    #[serde(default, deserialize_with = "lenient::number")]
    max_size: Option<f64>,
    #[serde(default, deserialize_with = "lenient::flag")]
    multiple: Option<bool>,
    #[serde(default, deserialize_with = "lenient::text")]
    store_file_in: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    result_variable: Option<String>,
}

impl FileUploadAction {
    fn allowed_types(&self) -> Vec<String> {
        let explicit: Vec<String> = self.allowed_types.iter().flatten().map(|t| t.trim().to_string()).filter(|t| !t.is_empty()).collect();
        if !explicit.is_empty() {
            return explicit;
        }

        let implied: &[&str] = match lenient::non_blank(&self.file_type) {
            Some("image") => &["image/*"],
            Some("video") => &["video/*"],
            Some("audio") => &["audio/*"],
            Some("document") => &[".pdf", ".doc", ".docx", ".txt"],
            Some("csv") => &["text/csv", ".csv"],
            Some("json") => &["application/json", ".json"],
            Some("xml") => &["application/xml", "text/xml", ".xml"],
            _ => &[],
        };
        implied.iter().map(|t| t.to_string()).collect()
    }

    fn max_size(&self) -> f64 {
        self.max_size.filter(|m| *m > 0.0).unwrap_or(DEFAULT_MAX_SIZE_MB)
    }

    fn type_matches(
        pattern: &str,
        file: &FileDescriptor,
    ) -> bool {
        let pattern = pattern.to_ascii_lowercase();
        let mime = file.mime_type.as_deref().map(str::to_ascii_lowercase);

        if pattern.starts_with('.') {
            file.name.to_ascii_lowercase().ends_with(&pattern)
        } else if let Some(prefix) = pattern.strip_suffix("*") {
            mime.is_some_and(|m| m.starts_with(prefix))
        } else {
            mime.is_some_and(|m| m == pattern)
        }
    }

    fn check(
        &self,
        file: &FileDescriptor,
    ) -> std::result::Result<(), String> {
        let max_size = self.max_size();
        if file.size.is_some_and(|size| size as f64 > max_size * BYTES_PER_MB) {
            return Err(format!("The file exceeds the {} MB limit", max_size));
        }

        let allowed = self.allowed_types();
        if !allowed.is_empty() && !allowed.iter().any(|p| Self::type_matches(p, file)) {
            return Err(format!("Allowed file types: {}", allowed.join(", ")));
        }

        Ok(())
    }
}

#[async_trait]
impl Action for FileUploadAction {
    fn create(params: Value) -> Result<Self> {
        parse_params(&Self::schema(), params)
    }

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "prompt": lenient::text_schema(),
                "label": lenient::text_schema(),
                "allowedTypes": { "type": ["array", "null"], "items": { "type": "string" } },
                "fileType": lenient::text_schema(),
                "maxSize": lenient::number_schema(),
                "multiple": lenient::flag_schema(),
                "storeFileIn": lenient::text_schema(),
                "resultVariable": lenient::text_schema()
            }
        })
    }

    fn action_type(&self) -> ActionType {
        ActionType::FileUpload
    }

    async fn enter(
        &self,
        ctx: &mut Context,
        _: &Links,
    ) -> Result<ActionOutput> {
        let prompt = lenient::non_blank(&self.prompt).or(lenient::non_blank(&self.label)).unwrap_or(DEFAULT_PROMPT);

        Ok(ActionOutput::suspend(NodeOutput::FileUpload {
            prompt: ctx.interpolate(prompt),
            allowed_types: self.allowed_types(),
            max_size: self.max_size(),
            multiple: self.multiple.unwrap_or(false),
        }))
    }

    async fn resume(
        &self,
        ctx: &mut Context,
        links: &Links,
        input: &UserInput,
    ) -> Result<ActionOutput> {
        let UserInput::File(file) = input else {
            return Ok(ActionOutput::reject(ErrorKind::InvalidInput, "Expected a file"));
        };

        if let Err(message) = self.check(file) {
            return Ok(ActionOutput::reject(ErrorKind::InvalidInput, message));
        }

        let value = input.to_value();
        if let Some(target) = lenient::non_blank(&self.store_file_in).or(lenient::non_blank(&self.result_variable)) {
            ctx.set_var(target, value.clone());
        }

        Ok(ActionOutput::advance(links.next(), Some(NodeOutput::FileUploadResponse { file: value })))
    }
}
