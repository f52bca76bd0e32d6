//! Output side of a sizing run: the flat template mapping, the HTML page, the
//! spreadsheet export and the logo encoding done at input time.

mod export;
mod fields;
mod html;
mod logo;

pub use export::{export_csv, export_html, write_csv, CSV_HEADERS};
pub use fields::{format_number, template_fields, REPORT_DATE_FORMAT};
pub use html::{render_html, render_template};
pub use logo::{encode_logo, LOGO_EXTENSIONS};
