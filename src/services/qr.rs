//! QR code rendering for tables, singly, in bulk, and as a printable sheet.
use base64::{prelude::BASE64_STANDARD, Engine as _};
use qrcode::{render::svg, QrCode};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    constants::qr::{QR_MAX_DIMENSION, QR_MIN_DIMENSION},
    db::{
        self,
        models::{restaurant::Restaurant, table::Table},
    },
    services::{
        access::{self, Permission},
        tables::qr_url,
    },
    utils::html,
};

/// The only image format produced.
pub const SVG_FORMAT: &str = "svg";

/// A rendered QR code for one table.
#[derive(Serialize)]
pub struct QrCodeImage {
    pub table_id: Uuid,
    pub table_name: String,
    pub unique_code: String,
    pub qr_url: String,
    /// The image, base64 encoded.
    pub qr_image_base64: String,
    pub format: &'static str,
}

/// A printable page of QR codes.
#[derive(Serialize)]
pub struct PrintSheet {
    pub restaurant_name: String,
    pub qr_codes: Vec<QrCodeImage>,
    pub html_content: String,
}

/// Render `data` as an SVG QR code and base64 encode it.
pub fn render_svg_base64(data: &str) -> Result<String, errors::QrError> {
    let code = QrCode::new(data.as_bytes()).map_err(errors::QrError::Encoding)?;
    let image = code
        .render::<svg::Color<'_>>()
        .min_dimensions(QR_MIN_DIMENSION, QR_MIN_DIMENSION)
        .max_dimensions(QR_MAX_DIMENSION, QR_MAX_DIMENSION)
        .build();
    Ok(BASE64_STANDARD.encode(image.as_bytes()))
}

fn render_table(table: Table, base_url: &str) -> Result<QrCodeImage, errors::QrError> {
    let url = qr_url(base_url, table.restaurant_id(), &table.unique_code);
    Ok(QrCodeImage {
        table_id: table.id(),
        qr_image_base64: render_svg_base64(&url)?,
        qr_url: url,
        table_name: table.name,
        unique_code: table.unique_code,
        format: SVG_FORMAT,
    })
}

/// Render the given tables, or every table of the restaurant when the list is
/// empty. Tables that do not belong to the restaurant are skipped.
async fn render_tables(
    restaurant_id: Uuid,
    table_ids: &[Uuid],
    base_url: &str,
    db_conn: &db::ConnectionPool,
) -> Result<Vec<QrCodeImage>, errors::QrError> {
    let tables = if table_ids.is_empty() {
        let mut tables = Table::select_for_restaurant(restaurant_id, db_conn).await?;
        tables.sort_by(|a, b| a.name.cmp(&b.name));
        tables
    } else {
        let mut tables = Vec::with_capacity(table_ids.len());
        for &table_id in table_ids {
            match Table::select_one(table_id, db_conn).await? {
                Some(table) if table.restaurant_id() == restaurant_id => tables.push(table),
                _ => tracing::warn!(%restaurant_id, %table_id, "skipping unknown table"),
            }
        }
        tables
    };
    tables
        .into_iter()
        .map(|table| render_table(table, base_url))
        .collect()
}

/// Render one table's QR code.
pub async fn generate(
    restaurant_id: Uuid,
    user_id: Uuid,
    table_id: Uuid,
    format: Option<&str>,
    base_url: &str,
    db_conn: &db::ConnectionPool,
) -> Result<QrCodeImage, errors::QrError> {
    access::require(restaurant_id, user_id, Permission::View, db_conn).await?;
    if let Some(format) = format.filter(|f| !f.eq_ignore_ascii_case(SVG_FORMAT)) {
        return Err(errors::QrError::UnsupportedFormat(format.to_owned()));
    }
    let table = Table::select_one(table_id, db_conn)
        .await?
        .filter(|table| table.restaurant_id() == restaurant_id)
        .ok_or(errors::QrError::TableNonExistent(table_id))?;
    render_table(table, base_url)
}

/// Render several tables' QR codes at once.
pub async fn generate_bulk(
    restaurant_id: Uuid,
    user_id: Uuid,
    table_ids: &[Uuid],
    base_url: &str,
    db_conn: &db::ConnectionPool,
) -> Result<Vec<QrCodeImage>, errors::QrError> {
    access::require(restaurant_id, user_id, Permission::View, db_conn).await?;
    render_tables(restaurant_id, table_ids, base_url, db_conn).await
}

/// Build an HTML page laying the QR codes out two to a row for printing.
pub fn render_print_sheet(restaurant_name: &str, qr_codes: &[QrCodeImage]) -> String {
    let title = html::escape(restaurant_name);
    let mut page = format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>QR Codes - {title}</title>
<style>
@media print {{ body {{ margin: 0; }} .qr-item {{ break-inside: avoid; }} }}
body {{ font-family: Arial, sans-serif; margin: 20px; }}
.header {{ text-align: center; margin-bottom: 30px; }}
.qr-grid {{ display: grid; grid-template-columns: repeat(2, 1fr); gap: 30px; }}
.qr-item {{ text-align: center; border: 1px solid #ddd; padding: 20px; border-radius: 8px; }}
.table-name {{ font-size: 18px; font-weight: bold; margin: 10px 0 5px; }}
.table-code {{ font-size: 14px; color: #666; }}
</style>
</head>
<body>
<div class="header"><h1>{title}</h1><h2>Table QR Codes</h2></div>
<div class="qr-grid">
"#
    );
    for qr in qr_codes {
        let table_name = html::escape(&qr.table_name);
        let code = html::escape(&qr.unique_code);
        page.push_str(&format!(
            r#"<div class="qr-item">
<img src="data:image/svg+xml;base64,{image}" alt="QR code for {table_name}" width="150" height="150">
<div class="table-name">{table_name}</div>
<div class="table-code">Code: {code}</div>
</div>
"#,
            image = qr.qr_image_base64,
        ));
    }
    page.push_str("</div>\n</body>\n</html>\n");
    page
}

/// Render a printable sheet for the given tables, or all tables when empty.
pub async fn print_sheet(
    restaurant_id: Uuid,
    user_id: Uuid,
    table_ids: &[Uuid],
    base_url: &str,
    db_conn: &db::ConnectionPool,
) -> Result<PrintSheet, errors::QrError> {
    access::require(restaurant_id, user_id, Permission::View, db_conn).await?;
    let restaurant = Restaurant::select_one(restaurant_id, db_conn)
        .await?
        .ok_or(errors::QrError::RestaurantNonExistent(restaurant_id))?;
    let qr_codes = render_tables(restaurant_id, table_ids, base_url, db_conn).await?;
    let html_content = render_print_sheet(&restaurant.name, &qr_codes);
    Ok(PrintSheet {
        restaurant_name: restaurant.name,
        qr_codes,
        html_content,
    })
}

pub mod errors {
    use thiserror::Error;
    use uuid::Uuid;

    use crate::{db::errors::DatabaseError, services::access::errors::AccessError};

    #[derive(Error, Debug)]
    pub enum QrError {
        #[error(transparent)]
        DatabaseError(#[from] DatabaseError),
        #[error(transparent)]
        Access(#[from] AccessError),
        #[error("Failed to encode QR code: {0:?}")]
        Encoding(qrcode::types::QrError),
        #[error("Unsupported QR format '{0}', only svg is available")]
        UnsupportedFormat(String),
        #[error("Table not found")]
        TableNonExistent(Uuid),
        #[error("Restaurant not found")]
        RestaurantNonExistent(Uuid),
    }
}
