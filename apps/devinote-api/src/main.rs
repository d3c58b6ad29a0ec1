use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = devinote_api::Args::parse();

	devinote_api::run(args).await
}
