//! `docpress render`: one document, then exit.

use anyhow::Result;
use docpress::config::PressConfig;
use docpress::log;
use docpress::pipeline::DocumentPipeline;

use super::{RenderArgs, load_record, write_output};

pub fn render_document(config: &PressConfig, args: &RenderArgs) -> Result<()> {
    let pipeline = DocumentPipeline::from_config(config)?;
    let record = load_record(args)?;

    if let Some(html_path) = &args.emit_html {
        let markup = pipeline.render_markup(record.as_ref(), &args.template)?;
        write_output(html_path, markup.as_bytes())?;
        log!("render"; "markup written to {}", html_path.display());
    }

    let bytes = pipeline.generate(record.as_ref(), &args.template)?;
    let output = args.output_path();
    write_output(&output, &bytes)?;
    log!("pdf"; "{} ({} bytes)", output.display(), bytes.len());

    Ok(())
}
