//! Image and video nodes. Both only render; neither touches variables.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    Result,
    runtime::Context,
    workflow::{
        actions::{ActionType, lenient},
        edge::Links,
        output::NodeOutput,
    },
};

use super::{Action, ActionOutput, parse_params};

const DEFAULT_VIDEO_PLATFORM: &str = "youtube";

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ImageAction {
    #[serde(default, deserialize_with = "lenient::text")]
    url: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    alt_text: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    caption: Option<String>,
    #[serde(default)]
    width: Option<Value>,
    #[serde(default)]
    height: Option<Value>,
}

#[async_trait]
impl Action for ImageAction {
    fn create(params: Value) -> Result<Self> {
        parse_params(&Self::schema(), params)
    }

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": lenient::text_schema(),
                "altText": lenient::text_schema(),
                "caption": lenient::text_schema(),
                "width": { "type": ["number", "string", "null"] },
                "height": { "type": ["number", "string", "null"] }
            }
        })
    }

    fn action_type(&self) -> ActionType {
        ActionType::Image
    }

    async fn enter(
        &self,
        ctx: &mut Context,
        links: &Links,
    ) -> Result<ActionOutput> {
        let render = |field: &Option<String>| ctx.interpolate(field.as_deref().unwrap_or_default());

        let output = NodeOutput::Image {
            url: render(&self.url),
            alt_text: render(&self.alt_text),
            caption: render(&self.caption),
            width: self.width.clone(),
            height: self.height.clone(),
        };

        Ok(ActionOutput::advance(links.next(), Some(output)))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct VideoAction {
    #[serde(default, deserialize_with = "lenient::text")]
    url: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    platform: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    autoplay: Option<bool>,
    #[serde(default, deserialize_with = "lenient::flag")]
    controls: Option<bool>,
    #[serde(default, deserialize_with = "lenient::flag")]
    muted: Option<bool>,
}

#[async_trait]
impl Action for VideoAction {
    fn create(params: Value) -> Result<Self> {
        parse_params(&Self::schema(), params)
    }

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": lenient::text_schema(),
                "platform": lenient::text_schema(),
                "autoplay": lenient::flag_schema(),
                "controls": lenient::flag_schema(),
                "muted": lenient::flag_schema()
            }
        })
    }

    fn action_type(&self) -> ActionType {
        ActionType::Video
    }

    async fn enter(
        &self,
        ctx: &mut Context,
        links: &Links,
    ) -> Result<ActionOutput> {
        let output = NodeOutput::Video {
            url: ctx.interpolate(self.url.as_deref().unwrap_or_default()),
            platform: lenient::non_blank(&self.platform).unwrap_or(DEFAULT_VIDEO_PLATFORM).to_string(),
            autoplay: self.autoplay.unwrap_or(false),
            controls: self.controls.unwrap_or(true),
            muted: self.muted.unwrap_or(false),
        };

        Ok(ActionOutput::advance(links.next(), Some(output)))
    }
}
