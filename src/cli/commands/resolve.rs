//! Resolve command implementation

use anyhow::Result;
use clap::Args;

use crate::app::App;
use crate::cli::ParsedLocation;
use crate::cli::response::NearestResponse;
use crate::nav::resolve;

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// File path with position (file:line[:column])
    pub location: String,
}

pub async fn execute(args: ResolveArgs, app: &App) -> Result<()> {
    let ctx = &app.output;
    let location = ParsedLocation::parse_absolute(&args.location)?;
    let position = location.position();

    let outline = app.navigator().outline(&location.file).await;
    let nearest = resolve(&outline, position);

    ctx.print(&NearestResponse::new(
        ctx.relative_path(&location.file),
        position,
        &nearest,
    ));
    Ok(())
}
