use platform_authz::{Grants, Permission};
use products_hr::{Caller, EmployeeService, dto::SaveEmployeeInput};
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};

pub const COMPANY: i64 = 7;
pub const OTHER_COMPANY: i64 = 8;
pub const USER: i64 = 3;

/// Single connection so the in-memory database survives across queries.
pub async fn setup() -> EmployeeService {
    let db = platform_db::connect_url("sqlite::memory:", 1).await.unwrap();
    bootstrap_sqlite(&db).await;
    EmployeeService::new(db)
}

async fn bootstrap_sqlite(db: &DatabaseConnection) {
    let statements = [
        r#"CREATE TABLE employees (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            company_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            description TEXT NULL,
            created_by_id INTEGER NULL,
            updated_by_id INTEGER NULL,
            deleted_by_id INTEGER NULL,
            created_at TEXT NULL,
            updated_at TEXT NULL,
            deleted_at TEXT NULL,
            UNIQUE (company_id, name)
        );"#,
        r#"CREATE TABLE activity_logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date_time TEXT NOT NULL,
            user_id INTEGER NOT NULL,
            module TEXT NOT NULL,
            entity_id INTEGER NOT NULL,
            entity_type_id INTEGER NOT NULL,
            activity_id INTEGER NOT NULL,
            activity TEXT NOT NULL,
            details TEXT NOT NULL
        );"#,
    ];
    for sql in statements {
        db.execute(Statement::from_string(DatabaseBackend::Sqlite, sql))
            .await
            .unwrap();
    }
}

pub fn caller() -> Caller {
    Caller::new(USER, COMPANY)
}

pub fn manager() -> Caller {
    caller().with_grants(Grants::new([Permission::EditEmployee, Permission::DeleteEmployee]))
}

pub fn input(name: &str) -> SaveEmployeeInput {
    SaveEmployeeInput {
        name: Some(name.to_string()),
        ..SaveEmployeeInput::default()
    }
}

pub async fn create(service: &EmployeeService, caller: &Caller, name: &str) -> i64 {
    service.save(caller, input(name)).await.unwrap().id
}
