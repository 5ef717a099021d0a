use sea_orm::{
    Condition,
    sea_query::{Expr, Func, LikeExpr},
};

use crate::core::record::RecordCore;

// Basic safety limit
pub const MAX_SEARCH_QUERY_LENGTH: usize = 10_000;

/// Escape LIKE wildcards so user input only ever matches literally.
#[must_use]
pub fn escape_like_wildcards(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Trim, cap and escape a raw `q` value into a `%...%` pattern.
///
/// Returns `None` for blank input.
#[must_use]
pub fn like_pattern(query: &str) -> Option<String> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return None;
    }
    let capped: String = trimmed.chars().take(MAX_SEARCH_QUERY_LENGTH).collect();
    Some(format!("%{}%", escape_like_wildcards(&capped).to_uppercase()))
}

/// `UPPER(col) LIKE '%Q%' ESCAPE '\'` OR'ed over every searchable column of `R`.
#[must_use]
pub fn search_condition<R: RecordCore>(query: &str) -> Option<Condition> {
    let pattern = like_pattern(query)?;
    let columns = R::search_columns();
    if columns.is_empty() {
        return None;
    }

    let condition = columns.into_iter().fold(Condition::any(), |condition, column| {
        let column_ref = Expr::col((R::Entity::default(), column));
        condition.add(
            Expr::expr(Func::upper(column_ref))
                .like(LikeExpr::new(pattern.clone()).escape('\\')),
        )
    });
    Some(condition)
}
