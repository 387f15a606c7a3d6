//! Single-file command implementations (convert, plan)

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use super::{EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::convert::{default_output_path, Converter};
use crate::frames::FrameSource;
use crate::layout::check_columns;

/// Print `err` and exit with `code`.
fn fail(err: impl std::fmt::Display, code: u8) -> ExitCode {
    eprintln!("Error: {}", err);
    ExitCode::from(code)
}

/// Output path when `-o` is not given: `<stem>.png` next to the input.
fn sibling_output(input: &Path) -> PathBuf {
    let dir = input.parent().unwrap_or_else(|| Path::new(""));
    default_output_path(input, dir)
}

/// Run the convert command
pub fn run_convert(input: &Path, output: Option<&Path>, columns: u32, metadata: bool) -> ExitCode {
    let output = output.map(Path::to_path_buf).unwrap_or_else(|| sibling_output(input));

    if output == input {
        eprintln!(
            "Error: output {} would overwrite the input; pass -o to choose another path",
            output.display()
        );
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    convert_with(&Converter::new(columns).with_metadata(metadata), input, &output)
}

/// Argument checks exit 2; anything failing once the input is read exits 1.
fn convert_with<S: FrameSource>(converter: &Converter<S>, input: &Path, output: &Path) -> ExitCode {
    if let Err(e) = converter.check(output) {
        return fail(e, EXIT_INVALID_ARGS);
    }

    match converter.convert(input, output) {
        Ok(report) => {
            let plan = &report.plan;
            println!(
                "{} -> {} ({} frames, {}x{} grid of {}x{} cells, {}x{} px)",
                report.input.display(),
                report.output.display(),
                plan.frame_count,
                plan.columns,
                plan.rows,
                plan.cell_width,
                plan.cell_height,
                plan.canvas_width,
                plan.canvas_height
            );
            if let Some(path) = &report.metadata {
                println!("metadata: {}", path.display());
            }
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => fail(e, EXIT_ERROR),
    }
}

/// Run the plan command
pub fn run_plan(input: &Path, columns: u32, json: bool) -> ExitCode {
    plan_with(&Converter::new(columns), input, json)
}

fn plan_with<S: FrameSource>(converter: &Converter<S>, input: &Path, json: bool) -> ExitCode {
    if let Err(e) = check_columns(converter.columns()) {
        return fail(e, EXIT_INVALID_ARGS);
    }

    let plan = match converter.plan(input) {
        Ok(plan) => plan,
        Err(e) => return fail(e, EXIT_ERROR),
    };

    if json {
        match serde_json::to_string_pretty(&plan) {
            Ok(text) => println!("{}", text),
            Err(e) => return fail(e, EXIT_ERROR),
        }
        return ExitCode::from(EXIT_SUCCESS);
    }

    println!("{}", input.display());
    println!("  frames:  {}", plan.frame_count);
    println!("  grid:    {} columns x {} rows", plan.columns, plan.rows);
    println!("  cell:    {}x{}", plan.cell_width, plan.cell_height);
    println!("  canvas:  {}x{}", plan.canvas_width, plan.canvas_height);
    println!("  unused:  {}", plan.cell_count() - plan.frame_count);

    ExitCode::from(EXIT_SUCCESS)
}
