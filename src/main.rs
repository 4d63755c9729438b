use std::path::Path;
use std::{env, fs, process};

use ps2asm::compiler;
use ps2asm::compiler::output::OutputMode;
use ps2asm::compiler::preprocessor::decode_latin1_lines;
use ps2asm::logging::{error, warning};

fn usage(program: &str) -> ! {
    eprintln!(
        "Usage: {} <input.asm> <output.txt> [--pnach] [--format-char <c>]",
        program
    );
    process::exit(1);
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let mut paths = Vec::new();
    let mut mode = OutputMode::Ps2;
    let mut format_char = "-".to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--pnach" => mode = OutputMode::Pnach,
            "--format-char" => {
                i += 1;
                match args.get(i) {
                    Some(c) => format_char = c.clone(),
                    None => usage(&args[0]),
                }
            }
            flag if flag.starts_with("--") => usage(&args[0]),
            path => paths.push(path.to_string()),
        }
        i += 1;
    }
    if paths.len() != 2 {
        usage(&args[0]);
    }
    let (input_path, output_path) = (&paths[0], &paths[1]);

    let bytes = fs::read(input_path).unwrap_or_else(|e| {
        error(format!("failed to read {}: {}", input_path, e));
        process::exit(2);
    });
    let lines = decode_latin1_lines(&bytes);

    let result = compiler::compile(&lines, Some(Path::new(input_path)), mode, &format_char);

    for diagnostic in &result.errors {
        error(diagnostic.to_string());
    }
    if result.success && result.output.is_empty() {
        warning("nothing was emitted".to_string());
    }

    fs::write(output_path, &result.output).unwrap_or_else(|e| {
        error(format!("failed to write to output file: {}", e));
        process::exit(3);
    });

    if !result.success {
        error(format!("{} error(s)", result.error_count()));
        process::exit(2);
    }
}
