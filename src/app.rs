use crate::config::Config;
use crate::db::Database;
use crate::error::{CropRotaError, Result};
use crate::logic::{build_plan, CropTable, RotationGenerator};
use crate::models::{Field, RotationPlan, SoilType, COMMON_CROPS, DEFAULT_PH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Fields,
    Plans,
    Crops,
    AddField,
}

impl Screen {
    pub fn from_key(c: char) -> Option<Self> {
        match c {
            '1' => Some(Screen::Fields),
            '2' => Some(Screen::Plans),
            '3' => Some(Screen::Crops),
            _ => None,
        }
    }
}

pub struct ListState {
    pub selected_index: usize,
}

impl ListState {
    pub fn new() -> Self {
        Self { selected_index: 0 }
    }

    pub fn next(&mut self, max: usize) {
        if max > 0 && self.selected_index < max - 1 {
            self.selected_index += 1;
        }
    }

    pub fn prev(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    /// Keeps the selection inside a list that just shrank.
    pub fn clamp(&mut self, len: usize) {
        if self.selected_index >= len {
            self.selected_index = len.saturating_sub(1);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Size,
    SoilType,
    CurrentCrop,
    Ph,
}

impl FormField {
    pub fn all() -> &'static [FormField] {
        &[
            FormField::Name,
            FormField::Size,
            FormField::SoilType,
            FormField::CurrentCrop,
            FormField::Ph,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Name => "Field Name",
            FormField::Size => "Size (acres)",
            FormField::SoilType => "Soil Type",
            FormField::CurrentCrop => "Current Crop",
            FormField::Ph => "Soil pH",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            FormField::Name => FormField::Size,
            FormField::Size => FormField::SoilType,
            FormField::SoilType => FormField::CurrentCrop,
            FormField::CurrentCrop => FormField::Ph,
            FormField::Ph => FormField::Name,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            FormField::Name => FormField::Ph,
            FormField::Size => FormField::Name,
            FormField::SoilType => FormField::Size,
            FormField::CurrentCrop => FormField::SoilType,
            FormField::Ph => FormField::CurrentCrop,
        }
    }
}

pub struct FieldFormState {
    pub focused: FormField,
    pub name: String,
    pub size: String,
    pub soil_index: Option<usize>,
    pub crop: String,
    pub crop_preset: Option<usize>,
    pub ph: String,
    pub errors: Vec<(FormField, String)>,
}

impl FieldFormState {
    pub fn new() -> Self {
        Self {
            focused: FormField::Name,
            name: String::new(),
            size: "0".into(),
            soil_index: None,
            crop: String::new(),
            crop_preset: None,
            ph: format!("{:.1}", DEFAULT_PH),
            errors: Vec::new(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn next_field(&mut self) {
        self.focused = self.focused.next();
    }

    pub fn prev_field(&mut self) {
        self.focused = self.focused.prev();
    }

    fn buffer_mut(&mut self) -> Option<&mut String> {
        match self.focused {
            FormField::Name => Some(&mut self.name),
            FormField::Size => Some(&mut self.size),
            FormField::CurrentCrop => Some(&mut self.crop),
            FormField::Ph => Some(&mut self.ph),
            FormField::SoilType => None,
        }
    }

    pub fn push_char(&mut self, c: char) {
        if self.focused == FormField::CurrentCrop {
            self.crop_preset = None;
        }
        if let Some(buf) = self.buffer_mut() {
            buf.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if self.focused == FormField::CurrentCrop {
            self.crop_preset = None;
        }
        if let Some(buf) = self.buffer_mut() {
            buf.pop();
        }
    }

    /// Steps through soil types, or through the common crop presets.
    pub fn cycle(&mut self, forward: bool) {
        match self.focused {
            FormField::SoilType => {
                self.soil_index = Some(step(self.soil_index, SoilType::all().len(), forward));
            }
            FormField::CurrentCrop => {
                let idx = step(self.crop_preset, COMMON_CROPS.len(), forward);
                self.crop_preset = Some(idx);
                self.crop = COMMON_CROPS[idx].to_string();
            }
            _ => {}
        }
    }

    pub fn soil_type(&self) -> Option<SoilType> {
        self.soil_index
            .and_then(|i| SoilType::all().get(i))
            .copied()
    }

    pub fn error_for(&self, field: FormField) -> Option<&str> {
        self.errors
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, msg)| msg.as_str())
    }

    /// Builds a field from the inputs, recording one message per invalid input.
    pub fn to_field(&mut self) -> Option<Field> {
        let mut errors = Vec::new();

        let name = self.name.trim().to_string();
        if name.is_empty() {
            errors.push((FormField::Name, "Field name is required.".to_string()));
        }

        let size = self.size.trim().parse::<f64>().ok();
        match size.map(crate::models::validate_size) {
            Some(Ok(())) => {}
            Some(Err(e)) => errors.push((FormField::Size, invalid_data_message(e))),
            None => errors.push((
                FormField::Size,
                "Please enter a non-negative size.".to_string(),
            )),
        }

        let soil_type = self.soil_type();
        if soil_type.is_none() {
            errors.push((FormField::SoilType, "Select a soil type.".to_string()));
        }

        let crop = self.crop.trim().to_string();
        if crop.is_empty() {
            errors.push((FormField::CurrentCrop, "Current crop is required.".to_string()));
        }

        let ph = self.ph.trim().parse::<f64>().ok();
        match ph.map(crate::models::validate_ph) {
            Some(Ok(())) => {}
            Some(Err(e)) => errors.push((FormField::Ph, invalid_data_message(e))),
            None => errors.push((
                FormField::Ph,
                "pH value must be between 0 and 14.".to_string(),
            )),
        }

        self.errors = errors;
        if !self.errors.is_empty() {
            return None;
        }

        let (size, soil_type, ph) = (size?, soil_type?, ph?);
        Some(Field::new(name, soil_type, crop).with_size(size).with_ph(ph))
    }
}

fn step(current: Option<usize>, len: usize, forward: bool) -> usize {
    match (current, forward) {
        (None, true) => 0,
        (None, false) => len - 1,
        (Some(i), true) => (i + 1) % len,
        (Some(i), false) => (i + len - 1) % len,
    }
}

fn invalid_data_message(err: CropRotaError) -> String {
    match err {
        CropRotaError::InvalidData(msg) => msg,
        other => other.to_string(),
    }
}

pub struct App {
    pub screen: Screen,
    pub should_quit: bool,
    pub config: Config,
    pub db: Database,
    pub table: CropTable,

    // Data
    pub fields: Vec<Field>,
    pub plans: Vec<RotationPlan>,

    // Screen states
    pub fields_state: ListState,
    pub plans_state: ListState,
    pub crops_state: ListState,
    pub form: FieldFormState,

    // UI state
    pub status_message: Option<String>,
}

impl App {
    pub fn new(config: Config, db: Database) -> Result<Self> {
        let table = CropTable::with_extra_crops(&config.rotation.extra_crops)?;
        let fields = db.list_fields()?;
        let plans = db.list_plans()?;

        Ok(Self {
            screen: Screen::Fields,
            should_quit: false,
            config,
            db,
            table,
            fields,
            plans,
            fields_state: ListState::new(),
            plans_state: ListState::new(),
            crops_state: ListState::new(),
            form: FieldFormState::new(),
            status_message: None,
        })
    }

    pub fn switch_screen(&mut self, screen: Screen) {
        if screen == Screen::AddField {
            self.form.reset();
        }
        self.screen = screen;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn set_status(&mut self, message: &str) {
        self.status_message = Some(message.to_string());
    }

    pub fn reload(&mut self) -> Result<()> {
        self.fields = self.db.list_fields()?;
        self.plans = self.db.list_plans()?;
        self.fields_state.clamp(self.fields.len());
        self.plans_state.clamp(self.plans.len());
        Ok(())
    }

    pub fn generator(&self) -> RotationGenerator<'_> {
        RotationGenerator::new(&self.table)
    }

    /// Validates the form; on success stores the field with a fresh plan.
    pub fn submit_form(&mut self) -> Result<bool> {
        let field = match self.form.to_field() {
            Some(f) => f,
            None => return Ok(false),
        };

        let plan = self.add_field(field)?;
        self.set_status(&format!("Field added. Plan: {}", plan.summary()));
        self.form.reset();
        self.screen = Screen::Fields;
        self.fields_state.selected_index = self.fields.len().saturating_sub(1);
        Ok(true)
    }

    /// Stores the field together with its first plan, or neither.
    pub fn add_field(&mut self, field: Field) -> Result<RotationPlan> {
        let generator = RotationGenerator::new(&self.table);
        let years = self.config.rotation.years;

        let plan = self.db.create_field_with_plan(&field, |id| {
            let mut saved = field.clone();
            saved.id = Some(id);
            build_plan(&generator, &saved, years, &mut rand::thread_rng())
        })?;
        self.reload()?;
        Ok(plan)
    }

    pub fn regenerate_selected(&mut self) -> Result<Option<RotationPlan>> {
        let id = match self.selected_field().and_then(|f| f.id) {
            Some(id) => id,
            None => return Ok(None),
        };
        let field = self
            .db
            .get_field(id)?
            .ok_or_else(|| CropRotaError::NotFound(format!("field {}", id)))?;

        let plan = build_plan(
            &self.generator(),
            &field,
            self.config.rotation.years,
            &mut rand::thread_rng(),
        )?;
        self.db.create_plan(&plan)?;
        self.reload()?;
        Ok(Some(plan))
    }

    pub fn delete_selected_field(&mut self) -> Result<()> {
        if let Some(id) = self.selected_field().and_then(|f| f.id) {
            let plans = self.db.plans_for_field(id)?.len();
            self.db.delete_field(id)?;
            tracing::info!(field_id = id, plans, "Deleted field");
            self.reload()?;
        }
        Ok(())
    }

    pub fn delete_plan(&mut self, id: &str) -> Result<()> {
        self.db.delete_plan(id)?;
        self.reload()
    }

    pub fn delete_selected_plan(&mut self) -> Result<()> {
        let id = match self.plans.get(self.plans_state.selected_index) {
            Some(plan) => plan.id.clone(),
            None => return Ok(()),
        };
        self.delete_plan(&id)
    }

    pub fn selected_field(&self) -> Option<&Field> {
        self.fields.get(self.fields_state.selected_index)
    }

    /// Newest plan for the field, if any.
    pub fn latest_plan_for(&self, field_id: i64) -> Option<&RotationPlan> {
        self.plans.iter().find(|p| p.field_id == field_id)
    }

    pub fn field_name(&self, field_id: i64) -> &str {
        self.fields
            .iter()
            .find(|f| f.id == Some(field_id))
            .map(|f| f.name.as_str())
            .unwrap_or("(deleted field)")
    }
}
