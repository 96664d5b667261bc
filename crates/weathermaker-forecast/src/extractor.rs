//! Field extraction from the provider's details page.
//!
//! The page markup is an upstream contract we don't control. Everything that
//! knows about class names lives in [`DetailsPageExtractor`]; the collector
//! only sees the [`FieldExtractor`] trait.

use scraper::{ElementRef, Html, Selector};

use crate::error::ExtractionError;
use crate::types::ExtractedFields;

/// Literal unit label replacing the page's temperature symbol
pub const TEMPERATURE_UNIT: &str = "deg C";

const TEMPERATURE_BLOCK: &str = "div.temperature";
const VALUE_SPAN: &str = "span.val.swap";
const SUMMARY: &str = "p#summary";
const WIND_BLOCK: &str = "div.wind";
const WIND_FORCE: &str = "span.num.swip";
const WIND_UNIT: &str = "span.unit.swap";
const WIND_DIRECTION: &str = "span.direction";

/// Turns a raw document into the three forecast fields.
pub trait FieldExtractor {
    fn extract(&self, document: &str) -> Result<ExtractedFields, ExtractionError>;
}

/// Extractor for the details page layout (`div.temperature`, `p#summary`, `div.wind`)
#[derive(Debug, Clone)]
pub struct DetailsPageExtractor {
    temperature_block: Selector,
    value_span: Selector,
    summary: Selector,
    wind_block: Selector,
    wind_force: Selector,
    wind_unit: Selector,
    wind_direction: Selector,
}

fn selector(css: &str) -> Result<Selector, ExtractionError> {
    Selector::parse(css).map_err(|e| ExtractionError::InvalidSelector(format!("{}: {}", css, e)))
}

impl DetailsPageExtractor {
    pub fn new() -> Result<Self, ExtractionError> {
        Ok(Self {
            temperature_block: selector(TEMPERATURE_BLOCK)?,
            value_span: selector(VALUE_SPAN)?,
            summary: selector(SUMMARY)?,
            wind_block: selector(WIND_BLOCK)?,
            wind_force: selector(WIND_FORCE)?,
            wind_unit: selector(WIND_UNIT)?,
            wind_direction: selector(WIND_DIRECTION)?,
        })
    }

    fn temperature(&self, doc: &Html) -> Result<String, ExtractionError> {
        let block = first(doc.root_element(), &self.temperature_block, TEMPERATURE_BLOCK)?;
        let value = first(block, &self.value_span, VALUE_SPAN)?;

        let text = value
            .text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        Ok(with_unit_label(&text))
    }

    fn condition(&self, doc: &Html) -> Result<String, ExtractionError> {
        let summary = first(doc.root_element(), &self.summary, SUMMARY)?;
        Ok(summary.text().collect())
    }

    fn wind(&self, doc: &Html) -> Result<String, ExtractionError> {
        let block = first(doc.root_element(), &self.wind_block, WIND_BLOCK)?;
        let value = first(block, &self.value_span, VALUE_SPAN)?;

        let force: String = first(value, &self.wind_force, WIND_FORCE)?.text().collect();
        let unit: String = first(value, &self.wind_unit, WIND_UNIT)?.text().collect();
        let direction = first(value, &self.wind_direction, WIND_DIRECTION)?
            .value()
            .attr("title")
            .ok_or(ExtractionError::MissingAttribute {
                region: WIND_DIRECTION,
                attribute: "title",
            })?;

        Ok(format!("{} {}    {}", force, unit, direction))
    }
}

impl FieldExtractor for DetailsPageExtractor {
    fn extract(&self, document: &str) -> Result<ExtractedFields, ExtractionError> {
        let doc = Html::parse_document(document);

        Ok(ExtractedFields {
            temperature: self.temperature(&doc)?,
            condition_text: self.condition(&doc)?,
            wind: self.wind(&doc)?,
        })
    }
}

fn first<'a>(
    scope: ElementRef<'a>,
    selector: &Selector,
    name: &'static str,
) -> Result<ElementRef<'a>, ExtractionError> {
    scope
        .select(selector)
        .next()
        .ok_or(ExtractionError::MissingRegion(name))
}

/// Replace a trailing unit symbol (e.g. `°`) with [`TEMPERATURE_UNIT`].
/// Values without a symbol just get the label appended.
pub fn with_unit_label(value: &str) -> String {
    let number = match value.chars().last() {
        Some(last) if !last.is_ascii_digit() => &value[..value.len() - last.len_utf8()],
        _ => value,
    };
    format!("{}{}", number, TEMPERATURE_UNIT)
}
