// Dweve SDR Graph - Study Definition Repository graph mapping
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Flat article ingestion.
//!
//! Articles are a single node type with two fixed to-many relations, so
//! they bypass the schema-driven upsert compiler and compile directly into
//! the same merge statements.

use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

use sdr_model::Article;

use crate::config::GraphConfig;
use crate::cypher::validate_string_length;
use crate::error::Result;
use crate::executor::TransactionExecutor;
use crate::store::WriteSummary;
use crate::upsert::{EdgeMerge, EdgeOrigin, EdgeRow, MergeStatement, NodeMerge, NodeRow, WriteStatement};
use crate::value::Value;

/// Node label of articles.
pub const ARTICLE_LABEL: &str = "Article";
/// Node label of categories.
pub const CATEGORY_LABEL: &str = "Category";
/// Node label of tags.
pub const TAG_LABEL: &str = "Tag";
/// Edge from an article to each of its categories.
pub const HAS_CATEGORY: &str = "HAS_CATEGORY";
/// Edge from an article to each of its tags.
pub const HAS_TAG: &str = "HAS_TAG";

/// Compile a batch of articles into merge statements.
///
/// Categories and tags are keyed by their trimmed name; blank names are
/// skipped. Articles without an id are skipped with a warning. A repeated
/// article id keeps the last occurrence.
pub fn compile_articles(articles: &[Article], config: &GraphConfig) -> Result<Vec<MergeStatement>> {
    let mut article_rows: BTreeMap<String, NodeRow> = BTreeMap::new();
    let mut categories = BTreeSet::new();
    let mut tags = BTreeSet::new();
    let mut category_edges = BTreeSet::new();
    let mut tag_edges = BTreeSet::new();

    for article in articles {
        if article.id.trim().is_empty() {
            warn!(title = %article.title, "article without id skipped");
            continue;
        }
        article_rows.insert(article.id.clone(), article_row(article, config)?);

        for name in article.categories.iter().map(|c| c.trim()).filter(|c| !c.is_empty()) {
            categories.insert(name.to_string());
            category_edges.insert(EdgeRow {
                from_id: article.id.clone(),
                to_id: name.to_string(),
            });
        }
        for name in article.tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
            tags.insert(name.to_string());
            tag_edges.insert(EdgeRow {
                from_id: article.id.clone(),
                to_id: name.to_string(),
            });
        }
    }

    let mut statements = Vec::new();
    if article_rows.is_empty() {
        return Ok(statements);
    }
    statements.push(MergeStatement::Nodes(NodeMerge {
        label: ARTICLE_LABEL.to_string(),
        rows: article_rows.into_values().collect(),
    }));
    push_named(&mut statements, CATEGORY_LABEL, HAS_CATEGORY, categories, category_edges);
    push_named(&mut statements, TAG_LABEL, HAS_TAG, tags, tag_edges);
    Ok(statements)
}

fn article_row(article: &Article, config: &GraphConfig) -> Result<NodeRow> {
    let fields = [
        ("title", &article.title),
        ("description", &article.description),
        ("body", &article.body),
        ("link", &article.link),
        ("publishedAt", &article.published_at),
    ];
    let mut props = BTreeMap::new();
    for (name, value) in fields {
        validate_string_length(value, name, config)?;
        props.insert(name.to_string(), Value::from(value.as_str()));
    }
    Ok(NodeRow {
        id: article.id.clone(),
        props,
    })
}

fn push_named(
    statements: &mut Vec<MergeStatement>,
    label: &str,
    edge_label: &str,
    names: BTreeSet<String>,
    edges: BTreeSet<EdgeRow>,
) {
    if names.is_empty() {
        return;
    }
    statements.push(MergeStatement::Nodes(NodeMerge {
        label: label.to_string(),
        rows: names
            .into_iter()
            .map(|name| NodeRow {
                id: name.clone(),
                props: BTreeMap::from([("name".to_string(), Value::from(name))]),
            })
            .collect(),
    }));
    statements.push(MergeStatement::Edges(EdgeMerge {
        from_label: ARTICLE_LABEL.to_string(),
        edge_label: edge_label.to_string(),
        to_label: label.to_string(),
        rows: edges.into_iter().collect(),
        origin: EdgeOrigin::Nested,
    }));
}

/// Compile and write a batch of articles in one transaction.
pub async fn ingest_articles(
    executor: &TransactionExecutor,
    articles: &[Article],
    config: &GraphConfig,
) -> Result<WriteSummary> {
    let writes: Vec<WriteStatement> = compile_articles(articles, config)?
        .into_iter()
        .map(WriteStatement::from)
        .collect();
    let summary = executor.write(&writes).await?;
    info!(articles = articles.len(), rows = summary.rows, "articles ingested");
    Ok(summary)
}
