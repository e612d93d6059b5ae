pub mod assets;
pub mod blueprint;
pub mod canvas;
pub mod config;
mod error;
mod fonts;
pub mod format;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod render;

pub use canvas::Canvas;
pub use config::RenderConfig;
pub use error::Error;
pub use model::{RenderedDocument, SubmissionRecord, Value};
pub use render::document_filename;

use std::path::{Path, PathBuf};
use std::time::Instant;

use pdf::PdfCanvas;

/// Render `record` on any canvas. The logo from `config` is loaded first;
/// a missing or unreadable logo degrades to a text mark.
pub fn render_with_canvas<C: Canvas>(
    record: &SubmissionRecord,
    form_type: Option<&str>,
    config: &RenderConfig,
    canvas: C,
) -> Result<RenderedDocument, Error> {
    let logo = assets::load_logo(config.logo_path.as_deref());
    let output = render::render_document(record, form_type, config, logo, canvas)?;
    let form_name = blueprint::form_type_name(record, form_type);
    Ok(RenderedDocument {
        bytes: output.bytes,
        page_count: output.page_count,
        page_breaks: output.page_breaks,
        filename: document_filename(record, &form_name),
    })
}

/// Render `record` to PDF bytes.
pub fn render_submission(
    record: &SubmissionRecord,
    form_type: Option<&str>,
    config: &RenderConfig,
) -> Result<RenderedDocument, Error> {
    let canvas = PdfCanvas::new(&config.page, &config.font);
    render_with_canvas(record, form_type, config, canvas)
}

/// Read a JSON submission from `input` and write the PDF to `output`, or to
/// the conventional filename in the current directory. Returns the path
/// written.
pub fn convert_json_to_pdf(
    input: &Path,
    output: Option<&Path>,
    form_type: Option<&str>,
    config: &RenderConfig,
) -> Result<PathBuf, Error> {
    let t0 = Instant::now();

    let text = std::fs::read_to_string(input).map_err(Error::Io)?;
    let record = SubmissionRecord::from_json_str(&text)?;
    let t_parse = t0.elapsed();

    let doc = render_submission(&record, form_type, config)?;
    let t_render = t0.elapsed();

    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&doc.filename));
    std::fs::write(&path, &doc.bytes).map_err(Error::Io)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: parse={:.1}ms, render={:.1}ms, write={:.1}ms, total={:.1}ms ({} pages, output {} bytes)",
        t_parse.as_secs_f64() * 1000.0,
        (t_render - t_parse).as_secs_f64() * 1000.0,
        (t_total - t_render).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        doc.page_count,
        doc.bytes.len(),
    );

    Ok(path)
}
