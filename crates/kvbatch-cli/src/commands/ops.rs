//! List stageable operations

use clap::Args;

use crate::settings::Settings;

#[derive(Debug, Args)]
pub struct OpsArgs {
    /// Print the names as a JSON array
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(args: OpsArgs, settings: &Settings) -> anyhow::Result<()> {
    let store = super::open_store(settings).await?;
    let names: Vec<&str> = store.operations().iter().map(|n| n.as_str()).collect();

    if args.json || settings.output.json {
        println!("{}", serde_json::to_string(&names)?);
    } else {
        for name in names {
            println!("{}", name);
        }
    }

    Ok(())
}
