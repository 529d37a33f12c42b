use sqlx::{Encode, PgPool, Postgres, QueryBuilder, Type};

use crate::entities::option_fields::OptionField;

#[derive(Clone)]
pub struct SqlxProjectRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxNewsRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxComplaintRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxSubscriberRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxTemplateRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxCampaignRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxHealthRepo {
    pub pool: PgPool,
}

/// Appends `, column = $n` to an `UPDATE ... SET updated_at = NOW()` builder.
pub(crate) fn push_assignment<'args, T>(builder: &mut QueryBuilder<'args, Postgres>, column: &str, value: T)
where
    T: 'args + Encode<'args, Postgres> + Type<Postgres> + Send,
{
    builder.push(", ").push(column).push(" = ").push_bind(value);
}

/// Same as [`push_assignment`] for nullable columns; `Unchanged` leaves the column alone.
pub(crate) fn push_nullable_assignment<'args>(
    builder: &mut QueryBuilder<'args, Postgres>,
    column: &str,
    value: &OptionField<String>,
) {
    if let Some(patch) = value.as_ref_option() {
        push_assignment(builder, column, patch.map(|v| v.trim().to_string()));
    }
}
