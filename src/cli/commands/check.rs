//! check command - Verify connection settings

use super::Context;
use crate::ui::output;
use anyhow::Result;

/// Connect, show the bound workspace, and disconnect.
pub fn check(ctx: &Context) -> Result<()> {
    let (address, user, workspace) = ctx.with_session(|session| {
        Ok((
            session.address().to_string(),
            session.username().map(str::to_string),
            session.workspace().clone(),
        ))
    })?;

    output::print(format!("Server: {}", address), ctx.verbosity);
    if let Some(user) = user {
        output::print(format!("User:   {}", user), ctx.verbosity);
    }
    output::print(output::format_workspace(&workspace), ctx.verbosity);
    Ok(())
}
