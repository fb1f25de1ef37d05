//! tmpl's main application entry point and orchestration logic.
//! Handles command-line argument parsing and dispatches the template
//! store and instantiation subcommands.

use tmpl::{
    cli::{get_args, Args, Command},
    error::{default_error_handler, Result},
    processor::Processor,
    prompt::DialoguerPrompter,
    template,
};

/// Main application entry point.
fn main() {
    let args = get_args();

    // Logger configuration
    env_logger::Builder::new()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .format_timestamp(None)
        .format_target(false)
        .init();

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

/// Dispatches the parsed subcommand.
fn run(args: Args) -> Result<()> {
    match args.command {
        Command::New { name, files, custom_dir, remove_source } => {
            let root = template::templates_root(custom_dir);
            let name = template::capture(&root, name, &files, remove_source)?;
            println!("Successful creating '{}' template!", name);
            Ok(())
        }
        Command::Use { name, custom_dir } => {
            let root = template::templates_root(custom_dir);
            let template_root = template::find(&root, &name)?;
            println!("Creating new project according to '{}' template...", name);

            let prompter = DialoguerPrompter::new();
            let mut processor = Processor::new(&prompter);
            processor.instantiate(&template_root)?;

            println!("Project successfully created!");
            Ok(())
        }
        Command::Rm { name, custom_dir } => {
            let root = template::templates_root(custom_dir);
            template::delete(&root, &name)?;
            println!("Template '{}' successfully deleted!", name);
            Ok(())
        }
        Command::Ls { custom_dir } => {
            let root = template::templates_root(custom_dir);
            let templates = template::list(&root)?;
            if templates.is_empty() {
                println!("No templates available at this time");
            } else {
                println!("Available templates:");
                for name in templates {
                    println!("\t{}", name);
                }
            }
            Ok(())
        }
    }
}
