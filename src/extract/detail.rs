//! Detail page field extraction
//!
//! Every field falls back to [`UNAVAILABLE`](crate::ad::UNAVAILABLE) when the
//! page does not carry it; extraction itself never fails.

use crate::ad::{AdDetails, CustomsCleared};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;

/// Selector whose presence marks a rendered detail page
pub const DETAIL_READY_SELECTOR: &str = ".offer__title";

const TITLE_SELECTOR: &str = "h1.offer__title";
const YEAR_SELECTOR: &str = "span.year";
const PRICE_SELECTOR: &str = "div.offer__price";
const DESCRIPTION_SELECTOR: &str = "div.offer__content-block.offer__description";
const SPEC_ROW_SELECTOR: &str = "dl";
const SPEC_LABEL_SELECTOR: &str = "dt.value-title";
const SPEC_VALUE_SELECTOR: &str = "dd.value";

// Labels of the characteristics rows, as they appear in the `title` attribute
const CITY_LABEL: &str = "Город";
const GENERATION_LABEL: &str = "Поколение";
const BODY_TYPE_LABEL: &str = "Кузов";
const ENGINE_VOLUME_LABEL: &str = "Объем двигателя, л";
const TRANSMISSION_LABEL: &str = "Коробка передач";
const DRIVE_TYPE_LABEL: &str = "Привод";
const WHEEL_SIDE_LABEL: &str = "Руль";
const COLOR_LABEL: &str = "Цвет";
const CUSTOMS_LABEL: &str = "Растаможен в Казахстане";

/// Extracts the ad fields from a rendered detail page
pub fn extract_details(html: &str) -> AdDetails {
    let document = Html::parse_document(html);
    let mut details = AdDetails::default();

    if let Some(heading) = select_first(&document, TITLE_SELECTOR) {
        set_if_present(&mut details.title, joined_text(heading, " "));

        if let Some(year) = select_first_in(heading, YEAR_SELECTOR) {
            set_if_present(&mut details.year, joined_text(year, " "));
        }
    }

    if let Some(price) = select_first(&document, PRICE_SELECTOR) {
        let amount = joined_text(price, "")
            .replace('\u{a0}', "")
            .replace('₸', "")
            .trim()
            .to_string();
        set_if_present(&mut details.price, amount);
    }

    if let Some(description) = select_first(&document, DESCRIPTION_SELECTOR) {
        set_if_present(&mut details.comment, joined_text(description, " "));
    }

    let mut rows = spec_rows(&document);
    let mut take = |field: &mut String, label: &str| {
        if let Some(value) = rows.remove(label) {
            set_if_present(field, value);
        }
    };
    take(&mut details.city, CITY_LABEL);
    take(&mut details.generation, GENERATION_LABEL);
    take(&mut details.body_type, BODY_TYPE_LABEL);
    take(&mut details.engine_volume, ENGINE_VOLUME_LABEL);
    take(&mut details.transmission, TRANSMISSION_LABEL);
    take(&mut details.drive_type, DRIVE_TYPE_LABEL);
    take(&mut details.wheel_side, WHEEL_SIDE_LABEL);
    take(&mut details.color, COLOR_LABEL);

    if let Some(token) = rows.get(CUSTOMS_LABEL) {
        details.customs_cleared = CustomsCleared::from_token(token);
    }

    details
}

/// Collects the `label -> value` characteristics rows of the page
fn spec_rows(document: &Html) -> HashMap<String, String> {
    let (Ok(row), Ok(label), Ok(value)) = (
        Selector::parse(SPEC_ROW_SELECTOR),
        Selector::parse(SPEC_LABEL_SELECTOR),
        Selector::parse(SPEC_VALUE_SELECTOR),
    ) else {
        return HashMap::new();
    };

    document
        .select(&row)
        .filter_map(|dl| {
            let key = dl.select(&label).next()?.value().attr("title")?.trim();
            let text = joined_text(dl.select(&value).next()?, " ");
            Some((key.to_string(), text))
        })
        .collect()
}

fn select_first<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    document.select(&selector).next()
}

fn select_first_in<'a>(element: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    element.select(&selector).next()
}

/// Trimmed, non-empty text nodes of an element joined by `separator`
fn joined_text(element: ElementRef<'_>, separator: &str) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

fn set_if_present(field: &mut String, value: String) {
    if !value.is_empty() {
        *field = value;
    }
}
