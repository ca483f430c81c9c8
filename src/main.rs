use clap::Parser;
use vmatch::cli::{Cli, Commands};
use vmatch::commands;
use vmatch::search::SearchQuery;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Search {
            make,
            model,
            year,
            json,
        }) => {
            let dataset = commands::open_dataset(cli.dataset.as_deref())?;
            let query = SearchQuery { make, model, year };
            let results = commands::search(&dataset, &query)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else if results.is_empty() {
                println!("No matches found");
            } else {
                print!("{}", commands::render_results(&results));
            }
            Ok(())
        }
        Some(Commands::Validate) => {
            let dataset = commands::open_dataset(cli.dataset.as_deref())?;
            let summary = commands::validate(&dataset)?;

            println!("Dataset: {}", dataset.location());
            println!("Records: {}", summary.records);
            println!("Makes: {}", summary.makes);
            println!("Electric: {}", summary.electric);
            if let Some((first, last)) = summary.years {
                println!("Years: {first}-{last}");
            }
            Ok(())
        }
        #[cfg(feature = "mcp")]
        Some(Commands::Serve) => {
            let dataset = commands::open_dataset(cli.dataset.as_deref())?;
            tokio::runtime::Runtime::new()?.block_on(vmatch::mcp::serve(dataset))
        }
        None => {
            Cli::parse_from(["vmatch", "--help"]);
            Ok(())
        }
    }
}
