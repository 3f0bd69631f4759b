use clap::Parser;
use form_autofill::cli::commands::{FillRequest, cmd_clear, cmd_extract, cmd_fill};
use form_autofill::cli::config::{
    Cli, Commands, build_extract_options, load_config, resolve_format,
};
use form_autofill::page::loader::PageSource;
use form_autofill::trace::logger::TraceLogger;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    // Trace file: CLI > config > disabled
    let tracer = TraceLogger::from_path(cli.trace.as_deref().or(config.output.trace.as_deref()));

    match cli.command {
        Commands::Extract {
            input,
            url,
            base_url,
            min_fields,
            max_fields,
            option_text,
            format,
            output,
        } => {
            let source = PageSource::from_args(input.as_deref(), url.as_deref())?;
            let options = build_extract_options(&config, min_fields, max_fields, option_text);
            let format = resolve_format(&config, format.as_deref());
            cmd_extract(
                &source,
                base_url.as_deref(),
                &options,
                &format,
                output.as_deref(),
                cli.verbose,
                &tracer,
            )?;
        }
        Commands::Fill {
            input,
            form,
            values,
            force,
            field,
            predictions,
            format,
            output,
        } => {
            let source = PageSource::File(input);
            let request = FillRequest::from_files(
                &form,
                values.as_deref(),
                predictions.as_deref(),
                force.as_deref(),
                field.as_deref(),
            )?;
            let format = resolve_format(&config, format.as_deref());
            cmd_fill(&source, &request, &format, output.as_deref(), cli.verbose, &tracer)?;
        }
        Commands::Clear {
            input,
            form,
            format,
            output,
        } => {
            let source = PageSource::File(input);
            let format = resolve_format(&config, format.as_deref());
            cmd_clear(&source, &form, &format, output.as_deref(), cli.verbose, &tracer)?;
        }
    }

    Ok(())
}
