//! Fetch, post-process and render in one call per entity type.

use crate::error::Result;
use crate::models::{InstitutionQuery, PublicationQuery};
use crate::process::process;
use crate::render::{render, OutputFormat, RenderOptions};
use crate::sources::Source;

/// Fetch publications, apply exclusions and author formatting, then render
pub async fn publications(
    source: &dyn Source,
    query: &PublicationQuery,
    format: &OutputFormat,
    options: &RenderOptions,
) -> Result<String> {
    let mut list = source.get_publications(query).await?;
    tracing::info!("{}: {} publications received", source.name(), list.len());

    list.docs = process(
        std::mem::take(&mut list.docs),
        &query.criteria,
        &options.author_style,
    );
    render(&list, format, options)
}

/// Fetch institutions and render them
pub async fn institutions(
    source: &dyn Source,
    query: &InstitutionQuery,
    format: &OutputFormat,
    options: &RenderOptions,
) -> Result<String> {
    let list = source.get_institutions(query).await?;
    tracing::info!("{}: {} institutions received", source.name(), list.len());
    render(&list, format, options)
}
