use apbs_input::file_processor::InputFormat;
use apbs_input::{logging, pipeline, syntax};
use std::env;
use std::process;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_global_logging()?;
    pipeline::validate_pipeline()?;

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("apbs_input");
    if args.len() < 2 {
        print_usage(program);
        process::exit(1);
    }

    let command = args[1].as_str();
    if command == "--help" || command == "-h" {
        print_help(program);
        return Ok(());
    }

    let Some(input) = args.get(2) else {
        eprintln!("Error: '{}' needs an input file", command);
        print_usage(program);
        process::exit(1);
    };

    let outcome = match command {
        "decode" => decode(input),
        "emit" => emit(input),
        "check" => check(input),
        "convert" => match args.get(3).map(|target| parse_target(target)) {
            Some(Some(format)) => convert(input, format),
            _ => {
                eprintln!("Error: convert needs a target format: json or toml");
                process::exit(1);
            }
        },
        other => {
            eprintln!("Error: unknown command '{}'", other);
            print_usage(program);
            process::exit(1);
        }
    };

    if let Err(error) = outcome {
        eprintln!("{}", error);
        process::exit(1);
    }
    Ok(())
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} <decode|emit|check|convert> <file> [json|toml]", program);
    eprintln!("       {} --help", program);
}

fn print_help(program: &str) {
    println!("APBS input front end v{}", env!("CARGO_PKG_VERSION"));
    println!("Decode legacy APBS inputs and check structured configuration documents");
    println!();
    println!("USAGE:");
    println!("    {} decode <input.in>              # Canonical mapping as JSON", program);
    println!("    {} emit <input.in>                # Normalized legacy text", program);
    println!("    {} check <input.json|toml>        # Validate a structured input", program);
    println!("    {} convert <input.json|toml> <json|toml>", program);
    println!();
    println!("OUTPUT:");
    println!("    Results go to stdout; warnings, diagnostics and logs go to stderr.");
    println!("    Any failure exits with status 1.");
    println!();
    println!("ENVIRONMENT:");
    println!("    APBS_LOG_LEVEL        error, warning, info or debug");
    println!("    APBS_LOG_FORMAT       console or json");
    println!("    APBS_LOG_COLOR        true or false");
    println!("    APBS_MAX_FILE_SIZE    Largest accepted input in bytes");
    println!("    APBS_MAX_TOKEN_COUNT  Largest accepted token count");
    println!("    APBS_WARN_DEPRECATED  Log deprecated keywords (true or false)");
    println!();
    println!("CURRENT SETTINGS:");
    println!("    {}", logging::config::get_config_summary());
}

fn parse_target(target: &str) -> Option<InputFormat> {
    match target.to_ascii_lowercase().as_str() {
        "json" => Some(InputFormat::Json),
        "toml" => Some(InputFormat::Toml),
        _ => None,
    }
}

fn decode(input: &str) -> Result<(), Box<dyn std::error::Error>> {
    let result = pipeline::decode_file(input)?;
    for warning in &result.decoded.warnings {
        eprintln!("{}", warning);
    }
    println!("{}", result.decoded.mapping.to_json_pretty()?);
    Ok(())
}

fn emit(input: &str) -> Result<(), Box<dyn std::error::Error>> {
    let result = pipeline::decode_file(input)?;
    for warning in &result.decoded.warnings {
        eprintln!("{}", warning);
    }
    print!("{}", syntax::emit(&result.decoded.mapping));
    Ok(())
}

fn check(input: &str) -> Result<(), Box<dyn std::error::Error>> {
    let loaded = pipeline::load_structured_file(input)?;
    println!(
        "{}: valid ({} calculation{})",
        input,
        loaded.input.calculate.len(),
        if loaded.input.calculate.len() == 1 { "" } else { "s" }
    );
    Ok(())
}

fn convert(input: &str, format: InputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let loaded = pipeline::load_structured_file(input)?;
    println!("{}", pipeline::encode(&loaded.input, format)?);
    Ok(())
}
