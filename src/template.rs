//! Recurring task templates.
//!
//! Templates are the external source the occurrence engine expands from:
//! `{id, name, start_date, interval_days, color, active}`. They are stored
//! in `.rota/templates.json` and are read-only to the engine; edits go
//! through [`TemplateSource`] and trigger the template pipeline.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::error::{Error, Result};
use crate::storage::Storage;

const TEMPLATES_SCHEMA_VERSION: &str = "rota.templates.v1";
const DEFAULT_COLOR: &str = "#000000";

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

/// A recurring task definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskTemplate {
    pub id: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub interval_days: i64,
    #[serde(default = "default_color")]
    pub color: String,
    pub active: bool,
}

impl TaskTemplate {
    /// Reject intervals that would make the expansion loop non-terminating
    pub fn validate(&self) -> Result<()> {
        if self.interval_days <= 0 {
            return Err(Error::InvalidInterval {
                template_id: self.id.clone(),
                interval: self.interval_days,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TemplateRegistry {
    schema_version: String,
    templates: Vec<TaskTemplate>,
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self {
            schema_version: TEMPLATES_SCHEMA_VERSION.to_string(),
            templates: Vec::new(),
        }
    }
}

/// Edits applied by `rota template set`; `None` leaves the field unchanged
#[derive(Debug, Clone, Default)]
pub struct TemplatePatch {
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub interval_days: Option<i64>,
    pub color: Option<String>,
}

/// The template source backing `templates.json`
#[derive(Debug, Clone)]
pub struct TemplateSource {
    storage: Storage,
}

impl TemplateSource {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    fn read_registry(&self) -> Result<TemplateRegistry> {
        self.storage
            .read_json_or(&self.storage.templates_file(), TemplateRegistry::default)
    }

    fn write_registry(&self, registry: &TemplateRegistry) -> Result<()> {
        self.storage
            .write_json(&self.storage.templates_file(), registry)
    }

    /// All templates, in registry order
    pub fn list(&self) -> Result<Vec<TaskTemplate>> {
        Ok(self.read_registry()?.templates)
    }

    /// Active templates only, in registry order; consumed by the engine
    pub fn list_active(&self) -> Result<Vec<TaskTemplate>> {
        let mut templates = self.list()?;
        templates.retain(|template| template.active);
        Ok(templates)
    }

    /// Look up one template by id
    pub fn find(&self, id: &str) -> Result<TaskTemplate> {
        self.list()?
            .into_iter()
            .find(|template| template.id == id)
            .ok_or_else(|| Error::TemplateNotFound(id.to_string()))
    }

    /// Add a new template; generates a ulid id when none is given
    pub fn add(
        &self,
        id: Option<String>,
        name: String,
        start_date: NaiveDate,
        interval_days: i64,
        color: Option<String>,
    ) -> Result<TaskTemplate> {
        let template = TaskTemplate {
            id: id.unwrap_or_else(|| Ulid::new().to_string().to_lowercase()),
            name,
            start_date,
            interval_days,
            color: color.unwrap_or_else(default_color),
            active: true,
        };
        template.validate()?;

        let mut registry = self.read_registry()?;
        if registry.templates.iter().any(|t| t.id == template.id) {
            return Err(Error::DuplicateTemplate(template.id));
        }
        registry.templates.push(template.clone());
        self.write_registry(&registry)?;
        Ok(template)
    }

    /// Apply a patch to an existing template
    pub fn update(&self, id: &str, patch: TemplatePatch) -> Result<TaskTemplate> {
        self.mutate(id, |template| {
            if let Some(name) = patch.name {
                template.name = name;
            }
            if let Some(start_date) = patch.start_date {
                template.start_date = start_date;
            }
            if let Some(interval_days) = patch.interval_days {
                template.interval_days = interval_days;
            }
            if let Some(color) = patch.color {
                template.color = color;
            }
        })
    }

    /// Flip the active flag
    pub fn set_active(&self, id: &str, active: bool) -> Result<TaskTemplate> {
        self.mutate(id, |template| template.active = active)
    }

    fn mutate(&self, id: &str, f: impl FnOnce(&mut TaskTemplate)) -> Result<TaskTemplate> {
        let mut registry = self.read_registry()?;
        let template = registry
            .templates
            .iter_mut()
            .find(|template| template.id == id)
            .ok_or_else(|| Error::TemplateNotFound(id.to_string()))?;
        f(template);
        template.validate()?;
        let updated = template.clone();
        self.write_registry(&registry)?;
        Ok(updated)
    }
}
