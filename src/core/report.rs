//! Catalog report: turns a movie snapshot into a four-column table and hands
//! it to the PDF renderer.

use crate::core::pdf;
use crate::domain::model::{ExportedDocument, Movie, Price};
use crate::utils::error::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const MEDIA_TYPE: &str = "application/pdf";
pub const DEFAULT_FILE_NAME: &str = "cartelera_cine.pdf";
pub const DEFAULT_TITLE: &str = "Cartelera del Cine Yae";
pub const COLUMN_HEADERS: [&str; 4] = ["Title", "Release Date", "Genre", "Ticket Price"];
pub const COLUMN_COUNT: usize = 4;

/// Date and currency conventions used for the data rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportLocale {
    pub tag: String,
    pub date_format: String,
    pub currency_symbol: String,
    pub symbol_after: bool,
    pub decimal_separator: char,
    pub group_separator: char,
}

impl ReportLocale {
    pub const SUPPORTED: [&'static str; 3] = ["en-US", "es-MX", "es-ES"];

    pub fn en_us() -> Self {
        Self {
            tag: "en-US".to_string(),
            date_format: "%m/%d/%Y".to_string(),
            currency_symbol: "$".to_string(),
            symbol_after: false,
            decimal_separator: '.',
            group_separator: ',',
        }
    }

    pub fn es_mx() -> Self {
        Self {
            tag: "es-MX".to_string(),
            date_format: "%d/%m/%Y".to_string(),
            ..Self::en_us()
        }
    }

    pub fn es_es() -> Self {
        Self {
            tag: "es-ES".to_string(),
            date_format: "%d/%m/%Y".to_string(),
            currency_symbol: "€".to_string(),
            symbol_after: true,
            decimal_separator: ',',
            group_separator: '.',
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "en-US" => Some(Self::en_us()),
            "es-MX" => Some(Self::es_mx()),
            "es-ES" => Some(Self::es_es()),
            _ => None,
        }
    }

    /// Short numeric date, e.g. `10/22/2021` for en-US.
    pub fn format_date(&self, date: &NaiveDate) -> String {
        date.format(&self.date_format).to_string()
    }

    pub fn format_currency(&self, price: Price) -> String {
        let cents = price.cents();
        let whole = group_digits(&(cents / 100).to_string(), self.group_separator);
        let amount = format!("{}{}{:02}", whole, self.decimal_separator, cents % 100);

        if self.symbol_after {
            format!("{} {}", amount, self.currency_symbol)
        } else {
            format!("{}{}", self.currency_symbol, amount)
        }
    }
}

impl Default for ReportLocale {
    fn default() -> Self {
        Self::en_us()
    }
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(ch);
    }
    grouped
}

/// Physical page and table geometry, in PDF points.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub width: f32,
    pub height: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    /// Share of the space between the margins taken by the table.
    pub table_width_percentage: f32,
    pub font_size: f32,
    pub cell_padding: f32,
    pub border_width: f32,
}

impl PageLayout {
    pub fn a4() -> Self {
        Self {
            width: 595.28,
            height: 841.89,
            margin_left: 10.0,
            margin_right: 10.0,
            margin_top: 10.0,
            margin_bottom: 0.0,
            table_width_percentage: 80.0,
            font_size: 12.0,
            cell_padding: 2.0,
            border_width: 0.5,
        }
    }
}

impl Default for PageLayout {
    fn default() -> Self {
        Self::a4()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportSettings {
    pub title: String,
    pub file_name: String,
    pub locale: ReportLocale,
    pub page: PageLayout,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            file_name: DEFAULT_FILE_NAME.to_string(),
            locale: ReportLocale::default(),
            page: PageLayout::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportCell {
    pub text: String,
    pub colspan: usize,
    pub bold: bool,
    pub align: Align,
}

impl ReportCell {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            colspan: 1,
            bold: false,
            align: Align::Left,
        }
    }

    pub fn banner(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            colspan: COLUMN_COUNT,
            bold: true,
            align: Align::Center,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub cells: Vec<ReportCell>,
}

impl ReportRow {
    pub fn texts(&self) -> Vec<&str> {
        self.cells.iter().map(|c| c.text.as_str()).collect()
    }
}

/// Banner row, header row, then one row per movie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTable {
    pub column_count: usize,
    pub rows: Vec<ReportRow>,
}

impl ReportTable {
    pub fn banner(&self) -> &ReportRow {
        &self.rows[0]
    }

    pub fn header(&self) -> &ReportRow {
        &self.rows[1]
    }

    pub fn data_rows(&self) -> &[ReportRow] {
        &self.rows[2..]
    }
}

pub struct ReportGenerator {
    settings: ReportSettings,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new(ReportSettings::default())
    }
}

impl ReportGenerator {
    pub fn new(settings: ReportSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ReportSettings {
        &self.settings
    }

    pub fn layout(&self, snapshot: &[Movie]) -> ReportTable {
        let locale = &self.settings.locale;
        let mut rows = Vec::with_capacity(snapshot.len() + 2);

        rows.push(ReportRow {
            cells: vec![ReportCell::banner(self.settings.title.clone())],
        });
        rows.push(ReportRow {
            cells: COLUMN_HEADERS.iter().map(|h| ReportCell::plain(*h)).collect(),
        });

        for movie in snapshot {
            rows.push(ReportRow {
                cells: vec![
                    ReportCell::plain(movie.title.clone()),
                    ReportCell::plain(locale.format_date(&movie.release_date)),
                    ReportCell::plain(movie.genre.clone()),
                    ReportCell::plain(locale.format_currency(movie.price)),
                ],
            });
        }

        ReportTable {
            column_count: COLUMN_COUNT,
            rows,
        }
    }

    /// Lays out and renders the snapshot. The snapshot is read once and never re-queried.
    pub fn generate(&self, snapshot: &[Movie]) -> Result<ExportedDocument> {
        let table = self.layout(snapshot);
        let bytes = pdf::render(&table, &self.settings.page, &self.settings.title)?;

        tracing::debug!(
            rows = table.data_rows().len(),
            bytes = bytes.len(),
            "rendered catalog report"
        );

        Ok(ExportedDocument {
            bytes,
            media_type: MEDIA_TYPE,
            file_name: self.settings.file_name.clone(),
        })
    }
}
