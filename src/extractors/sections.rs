use log::debug;
use scraper::{ElementRef, Html, Selector};

use super::{element_text, first_success, select_text, Strategy};
use crate::model::RecipeSection;

const INGREDIENTS_TITLE: &str = "Ingredientes";
const INSTRUCTIONS_TITLE: &str = "Modo de Preparo";

const INGREDIENTS_CONTAINER: &str = ".recipe-section.recipe-ingredients";
const INGREDIENT_SUBTITLE: &str = "recipe-ingredients-subtitle";
const INGREDIENT_WRAPPER: &str = "recipe-ingredients-item-wrapper";
const INGREDIENT_LABEL: &str = ".recipe-ingredients-item-label";

const STEP_ITEM: &str = ".recipe-steps-item";
const STEP_TITLE: &str = ".recipe-steps-title";
const STEP_TEXT: &str = ".recipe-steps-text";

/// Accumulates titled sections, dropping any that end up empty.
struct SectionBuilder {
    sections: Vec<RecipeSection>,
    current: RecipeSection,
}

impl SectionBuilder {
    fn new(default_title: &str) -> Self {
        Self {
            sections: Vec::new(),
            current: RecipeSection::new(default_title),
        }
    }

    fn start(&mut self, title: String) {
        let previous = std::mem::replace(&mut self.current, RecipeSection::new(title));
        if !previous.items.is_empty() {
            self.sections.push(previous);
        }
    }

    fn push(&mut self, item: String) {
        if !item.is_empty() {
            self.current.items.push(item);
        }
    }

    fn finish(mut self) -> Vec<RecipeSection> {
        if !self.current.items.is_empty() {
            self.sections.push(self.current);
        }
        self.sections
    }
}

fn has_class(element: ElementRef, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

/// Walks the ingredients container; `None` when the page has no container.
fn sectioned_ingredients(document: &Html) -> Option<Vec<RecipeSection>> {
    let container_selector = Selector::parse(INGREDIENTS_CONTAINER).ok()?;
    let container = document.select(&container_selector).next()?;
    let nodes = Selector::parse(&format!(".{INGREDIENT_SUBTITLE}, .{INGREDIENT_WRAPPER}")).ok()?;

    let mut builder = SectionBuilder::new(INGREDIENTS_TITLE);
    for node in container.select(&nodes) {
        if has_class(node, INGREDIENT_SUBTITLE) {
            builder.start(element_text(node));
        } else if let Some(label) = select_text(node, INGREDIENT_LABEL) {
            builder.push(label);
        }
    }
    Some(builder.finish())
}

/// Every ingredient label on the page as a single section.
fn loose_ingredients(document: &Html) -> Option<Vec<RecipeSection>> {
    let labels = Selector::parse(INGREDIENT_LABEL).ok()?;
    let mut builder = SectionBuilder::new(INGREDIENTS_TITLE);
    for label in document.select(&labels) {
        builder.push(element_text(label));
    }
    Some(builder.finish())
}

/// Ingredient sections in page order. Never fails; a page without any
/// ingredient markup yields no sections.
pub fn extract_ingredients(document: &Html) -> Vec<RecipeSection> {
    let strategies: [Strategy<Vec<RecipeSection>>; 2] =
        [Box::new(sectioned_ingredients), Box::new(loose_ingredients)];
    let sections = first_success(document, &strategies).unwrap_or_default();
    debug!("Found {} ingredient sections", sections.len());
    sections
}

/// Instruction sections. A step with a title opens a new section; steps
/// before the first title go under "Modo de Preparo".
pub fn extract_instructions(document: &Html) -> Vec<RecipeSection> {
    let Ok(steps) = Selector::parse(STEP_ITEM) else {
        return Vec::new();
    };

    let mut builder = SectionBuilder::new(INSTRUCTIONS_TITLE);
    for step in document.select(&steps) {
        if let Some(title) = select_text(step, STEP_TITLE) {
            builder.start(title);
        }
        if let Some(text) = select_text(step, STEP_TEXT) {
            builder.push(text);
        }
    }
    builder.finish()
}
