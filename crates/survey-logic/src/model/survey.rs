use crate::model::component::Component;
use crate::model::page::Page;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Survey-wide behavior switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SurveySettings {
    #[serde(default = "enabled")]
    pub allow_back: bool,
    #[serde(default = "enabled")]
    pub show_progress: bool,
}

impl Default for SurveySettings {
    fn default() -> Self {
        Self {
            allow_back: true,
            show_progress: true,
        }
    }
}

fn enabled() -> bool {
    true
}

/// Top-level survey definition: an ordered sequence of pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Survey {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub settings: SurveySettings,
    pub pages: Vec<Page>,
}

impl Survey {
    pub fn new(id: impl Into<String>, title: impl Into<String>, pages: Vec<Page>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            version: None,
            settings: SurveySettings::default(),
            pages,
        }
    }

    pub fn page(&self, id: &str) -> Option<&Page> {
        self.pages.iter().find(|page| page.id == id)
    }

    pub fn page_index(&self, id: &str) -> Option<usize> {
        self.pages.iter().position(|page| page.id == id)
    }

    pub fn first_page(&self) -> Option<&Page> {
        self.pages.first()
    }

    /// Page that follows `id` in declared order.
    pub fn page_after(&self, id: &str) -> Option<&Page> {
        let index = self.page_index(id)?;
        self.pages.get(index + 1)
    }

    pub fn component(&self, id: &str) -> Option<&Component> {
        self.pages.iter().find_map(|page| page.component(id))
    }

    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.pages.iter().flat_map(|page| page.components.iter())
    }
}
