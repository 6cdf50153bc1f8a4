use chrono::NaiveDate;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};

use crate::error::{AppError, AppResult};
use crate::services::aggregation::{MacroTotals, WEEK_DAYS};
use crate::services::nutrition::round_half_up;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;

pub struct WeeklyReport<'a> {
    pub user_name: &'a str,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub totals: MacroTotals,
}

impl WeeklyReport<'_> {
    pub fn average_daily_calories(&self) -> i64 {
        round_half_up(self.totals.calories as f64 / WEEK_DAYS as f64) as i64
    }

    /// Text lines in page order, as (font size, text).
    pub fn lines(&self) -> Vec<(f32, String)> {
        let t = &self.totals;
        vec![
            (20.0, "Weekly Diet Report".to_string()),
            (12.0, format!("User: {}", self.user_name)),
            (
                12.0,
                format!(
                    "Period: {} - {}",
                    self.start.format("%a %b %d %Y"),
                    self.end.format("%a %b %d %Y")
                ),
            ),
            (14.0, "Weekly Summary:".to_string()),
            (11.0, format!("Total Calories: {} kcal", t.calories)),
            (11.0, format!("Total Protein: {}g", fmt_grams(t.protein))),
            (11.0, format!("Total Carbs: {}g", fmt_grams(t.carbs))),
            (11.0, format!("Total Fats: {}g", fmt_grams(t.fats))),
            (
                11.0,
                format!("Average Daily Calories: {} kcal", self.average_daily_calories()),
            ),
        ]
    }

    pub fn render(&self) -> AppResult<Vec<u8>> {
        let (doc, page, layer) =
            PdfDocument::new("Weekly Diet Report", Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Report");
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_error)?;
        let layer = doc.get_page(page).get_layer(layer);

        let mut y = PAGE_HEIGHT - MARGIN;
        for (i, (size, text)) in self.lines().into_iter().enumerate() {
            let font = if size >= 14.0 { &bold } else { &regular };
            write_line(&layer, &text, size, y, font);
            y -= size * 0.6 + 2.0;
            // Extra space after the header block and the section title.
            if i == 2 || i == 3 {
                y -= 6.0;
            }
        }

        doc.save_to_bytes().map_err(pdf_error)
    }
}

fn write_line(layer: &PdfLayerReference, text: &str, size: f32, y: f32, font: &IndirectFontRef) {
    layer.use_text(text, size, Mm(MARGIN), Mm(y), font);
}

fn fmt_grams(value: f64) -> String {
    format!("{}", round_half_up(value * 10.0) / 10.0)
}

fn pdf_error(e: printpdf::Error) -> AppError {
    AppError::Internal(anyhow::anyhow!("Failed to render PDF: {}", e))
}
