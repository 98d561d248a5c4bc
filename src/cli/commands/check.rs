use crate::auth::{check_local, PublicRoutes};
use crate::cli::config::load_session_file_from;
use crate::cli::utils::output_navigation;
use crate::cli::CliContext;

/// Run the cheap route guard for `path` against the stored session.
/// Purely local; the backend is not contacted.
pub fn handle(path: &str, ctx: &CliContext) -> anyhow::Result<()> {
    let session = load_session_file_from(&ctx.config_dir)?.session();
    let public = PublicRoutes::from_config(&ctx.config.session);

    let navigation = check_local(path, &session, &public);
    output_navigation(&ctx.output_format, path, &navigation)
}
