use chrono::Utc;
use entity::{activity_logs, employees};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, DbErr, EntityTrait, Order, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select, TransactionTrait,
    prelude::DateTimeWithTimeZone,
    sea_query::{Expr, Func, LikeExpr, SimpleExpr},
};
use tracing::{info, instrument};

use crate::{
    Caller, EmployeeError, EmployeeResult,
    audit::{self, ActivityKind},
    dto::{
        DeleteOutcome, EmployeeForm, EmployeeListQuery, EmployeePage, EmployeeRecord,
        EmployeeRow, EmployeeStatus, FormMode, RowActions, SaveEmployeeInput, SaveOutcome,
        SortColumn, SortDirection, StatusFilter,
    },
    validation::{self, EmployeeFields},
};

#[derive(Clone, Debug)]
pub struct EmployeeService {
    db: DatabaseConnection,
}

impl EmployeeService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Tenant-scoped listing. Soft-deleted rows are included unless the status
    /// filter excludes them.
    #[instrument(name = "hr.employees.list", skip_all, fields(company_id = caller.company_id))]
    pub async fn list(
        &self,
        caller: &Caller,
        query: &EmployeeListQuery,
    ) -> EmployeeResult<EmployeePage> {
        let scoped = employees::Entity::find()
            .filter(employees::Column::CompanyId.eq(caller.company_id));
        let records_total = scoped.clone().count(&self.db).await?;

        let filtered = apply_filters(scoped, query);
        let records_filtered = filtered.clone().count(&self.db).await?;

        let rows = apply_ordering(filtered, query.order_by, query.order_dir)
            .offset(query.offset())
            .limit(query.limit())
            .all(&self.db)
            .await?;

        let actions = RowActions::for_caller(caller);
        Ok(EmployeePage {
            draw: query.draw,
            records_total,
            records_filtered,
            data: rows
                .into_iter()
                .map(|model| EmployeeRow::from_model(model, actions))
                .collect(),
        })
    }

    #[instrument(name = "hr.employees.form", skip_all, fields(company_id = caller.company_id, employee_id = id))]
    pub async fn form(&self, caller: &Caller, id: Option<i64>) -> EmployeeResult<EmployeeForm> {
        let Some(id) = id else {
            return Ok(EmployeeForm {
                employee: EmployeeRecord::default(),
                action: FormMode::Add,
            });
        };
        let model = find_scoped(&self.db, caller.company_id, id)
            .await?
            .ok_or(EmployeeError::NotFound(id))?;
        Ok(EmployeeForm {
            employee: model.into(),
            action: FormMode::Edit,
        })
    }

    /// Create (no id) or update an employee, then log the write.
    #[instrument(name = "hr.employees.save", skip_all, fields(company_id = caller.company_id, employee_id = input.id))]
    pub async fn save(
        &self,
        caller: &Caller,
        input: SaveEmployeeInput,
    ) -> EmployeeResult<SaveOutcome> {
        let fields = EmployeeFields::from_input(&input);
        let name_taken = if fields.has_name() {
            self.name_taken(caller.company_id, &fields.name, input.id)
                .await?
        } else {
            false
        };
        validation::validate(&fields, name_taken).map_err(EmployeeError::Validation)?;

        let now: DateTimeWithTimeZone = Utc::now().into();
        let txn = self.db.begin().await?;

        let existing = match input.id {
            Some(id) => match find_scoped(&txn, caller.company_id, id).await? {
                Some(model) => Some(model),
                None => {
                    txn.rollback().await?;
                    return Err(EmployeeError::NotFound(id));
                }
            },
            None => None,
        };
        let created = existing.is_none();
        let already_inactive = existing.as_ref().is_some_and(|model| !model.is_active());

        let mut active = match existing {
            Some(model) => {
                let mut active: employees::ActiveModel = model.into();
                active.updated_by_id = Set(Some(caller.user_id));
                active.updated_at = Set(Some(now));
                active
            }
            None => employees::ActiveModel {
                created_by_id: Set(Some(caller.user_id)),
                created_at: Set(Some(now)),
                updated_by_id: Set(None),
                updated_at: Set(None),
                ..Default::default()
            },
        };
        active.name = Set(fields.name);
        active.description = Set(fields.description);
        active.company_id = Set(caller.company_id);
        match input.status {
            // Re-saving an inactive record keeps the original deactivation markers.
            EmployeeStatus::Inactive if already_inactive => {}
            EmployeeStatus::Inactive => {
                active.deleted_at = Set(Some(now));
                active.deleted_by_id = Set(Some(caller.user_id));
            }
            EmployeeStatus::Active => {
                active.deleted_at = Set(None);
                active.deleted_by_id = Set(None);
            }
        }

        let written = if created {
            active.insert(&txn).await
        } else {
            active.update(&txn).await
        };
        let saved = written.map_err(EmployeeError::from_write)?;

        let kind = if created {
            ActivityKind::Created
        } else {
            ActivityKind::Updated
        };
        audit::append(&txn, kind, caller.user_id, &saved, now).await?;
        txn.commit().await?;

        info!(
            employee_id = saved.id,
            activity = kind.label(),
            status = EmployeeStatus::of(&saved).as_str(),
            "employee saved"
        );
        Ok(SaveOutcome::new(saved.id, created))
    }

    /// Permanently remove an employee, soft-deleted or not.
    #[instrument(name = "hr.employees.delete", skip_all, fields(company_id = caller.company_id, employee_id = id))]
    pub async fn delete(&self, caller: &Caller, id: i64) -> EmployeeResult<DeleteOutcome> {
        let txn = self.db.begin().await?;

        let Some(existing) = find_scoped(&txn, caller.company_id, id).await? else {
            txn.rollback().await?;
            return Err(EmployeeError::NotFound(id));
        };

        let result = employees::Entity::delete_many()
            .filter(employees::Column::Id.eq(id))
            .filter(employees::Column::CompanyId.eq(caller.company_id))
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Err(EmployeeError::NotFound(id));
        }

        let now: DateTimeWithTimeZone = Utc::now().into();
        audit::append(&txn, ActivityKind::Deleted, caller.user_id, &existing, now).await?;
        txn.commit().await?;

        info!(employee_id = id, "employee force-deleted");
        Ok(DeleteOutcome::default())
    }

    /// Audit trail of one employee of the caller's company, newest first.
    #[instrument(name = "hr.employees.activity", skip_all, fields(company_id = caller.company_id, employee_id = id))]
    pub async fn activity(
        &self,
        caller: &Caller,
        id: i64,
    ) -> EmployeeResult<Vec<activity_logs::Model>> {
        if find_scoped(&self.db, caller.company_id, id).await?.is_none() {
            return Err(EmployeeError::NotFound(id));
        }
        Ok(audit::history(&self.db, id).await?)
    }

    async fn name_taken(
        &self,
        company_id: i64,
        name: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, DbErr> {
        let mut query = employees::Entity::find()
            .filter(employees::Column::CompanyId.eq(company_id))
            .filter(employees::Column::Name.eq(name));
        if let Some(id) = exclude_id {
            query = query.filter(employees::Column::Id.ne(id));
        }
        Ok(query.count(&self.db).await? > 0)
    }
}

/// Lookup that ignores soft deletion but never crosses tenants.
async fn find_scoped<C>(
    conn: &C,
    company_id: i64,
    id: i64,
) -> Result<Option<employees::Model>, DbErr>
where
    C: ConnectionTrait,
{
    employees::Entity::find_by_id(id)
        .filter(employees::Column::CompanyId.eq(company_id))
        .one(conn)
        .await
}

fn apply_filters(
    mut query: Select<employees::Entity>,
    params: &EmployeeListQuery,
) -> Select<employees::Entity> {
    if let Some(name) = params.name_filter() {
        query = query.filter(contains_ci(employees::Column::Name, name));
    }
    match params.status_filter() {
        Some(StatusFilter::Active) => {
            query = query.filter(employees::Column::DeletedAt.is_null());
        }
        Some(StatusFilter::Inactive) => {
            query = query.filter(employees::Column::DeletedAt.is_not_null());
        }
        None => {}
    }
    if let Some(term) = params.search_term() {
        query = query.filter(
            Condition::any()
                .add(contains_ci(employees::Column::Name, term))
                .add(contains_ci(employees::Column::Description, term)),
        );
    }
    query
}

const LIKE_ESCAPE: char = '!';

/// Case-insensitive substring match; `%` and `_` in the needle are literal.
fn contains_ci(column: employees::Column, needle: &str) -> SimpleExpr {
    let pattern = format!("%{}%", escape_like(&needle.to_lowercase()));
    Expr::expr(Func::lower(Expr::col(column))).like(LikeExpr::new(pattern).escape(LIKE_ESCAPE))
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_') || ch == LIKE_ESCAPE {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(ch);
    }
    escaped
}

fn apply_ordering(
    query: Select<employees::Entity>,
    column: SortColumn,
    direction: SortDirection,
) -> Select<employees::Entity> {
    let order = match direction {
        SortDirection::Asc => Order::Asc,
        SortDirection::Desc => Order::Desc,
    };
    match column {
        SortColumn::Id => query.order_by(employees::Column::Id, order),
        SortColumn::Name => query
            .order_by(employees::Column::Name, order)
            .order_by(employees::Column::Id, Order::Asc),
    }
}
