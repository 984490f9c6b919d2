use clap::{Parser, Subcommand};
use dotenv::dotenv;
use retailx_rs::adk::agent::Agent;
use retailx_rs::retailx::builder::{open_dataset, Builder};
use retailx_rs::retailx::config::{DatasetSettings, Settings};
use retailx_rs::retailx::data::{QueryExecutor, DATA_DESCRIPTION};
use retailx_rs::retailx::server::{self, EMPTY_QUESTION_MESSAGE};

use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask a question about RetailX customers, products, and sales
    Ask {
        /// The question to answer
        #[arg(short, long)]
        question: String,
    },
    /// Run a SQL query directly against the dataset
    Query {
        /// The query to run
        #[arg(short, long)]
        sql: String,
    },
    /// Print the dataset description given to the model
    Schema,
    /// Serve the HTTP API
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    match args.command {
        Commands::Ask { question } => {
            if question.trim().is_empty() {
                println!("{}", EMPTY_QUESTION_MESSAGE);
                return Ok(());
            }

            let workflow = Builder::new(Settings::from_env()?).build_workflow()?;
            let answer = workflow.run(question).await?;
            println!("Answer: {}", answer);
        }
        Commands::Query { sql } => {
            let executor = open_dataset(&DatasetSettings::from_env()?)?;

            match executor.execute(&sql).await {
                Ok(table) => println!("{}", table),
                Err(e) => println!("Error: {}", e),
            }
        }
        Commands::Schema => {
            println!("{}", DATA_DESCRIPTION);
        }
        Commands::Serve { port } => {
            let workflow = Builder::new(Settings::from_env()?).build_workflow()?;
            log::info!("Serving workflow: {}", workflow.name());
            server::serve(Arc::new(workflow), port).await?;
        }
    }

    Ok(())
}
