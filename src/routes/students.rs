//! Student record routes
//!
//! CRUD scoped to the owning college or agency, plus bulk import from
//! CSV/XLSX sheets and report export.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::pagination::{Paginated, PaginationParams};
use crate::api::response::{Created, DataResponse};
use crate::app::AppState;
use crate::auth::RequireAuth;
use crate::domain::students::{
    CreateStudentInput, StudentQuery, StudentResponse, UpdateStudentInput,
};
use crate::domain::users::UserRole;
use crate::error::ApiError;
use crate::ingest::{self, RowError, StudentImportRow};
use crate::routes::{agency_id_for_user, college_id_for_user, decimal_to_f64, is_unique_violation};
use crate::services::{activity, email, notifications, platform};

// ============================================================================
// Scope
// ============================================================================

/// Which roster the caller manages
#[derive(Debug, Clone, Copy)]
enum StudentScope {
    College(Uuid),
    Agency(Uuid),
}

async fn scope_for(state: &AppState, auth: &RequireAuth) -> Result<StudentScope, ApiError> {
    match auth.role {
        UserRole::College => college_id_for_user(&state.db, auth.user_id)
            .await?
            .map(StudentScope::College)
            .ok_or_else(|| ApiError::forbidden("No college profile for this account")),
        UserRole::Agency => agency_id_for_user(&state.db, auth.user_id)
            .await?
            .map(StudentScope::Agency)
            .ok_or_else(|| ApiError::forbidden("No agency profile for this account")),
        _ => Err(ApiError::forbidden(
            "Only colleges and agencies manage student records",
        )),
    }
}

impl StudentScope {
    /// (college_id, agency_id) bind pair for the shared `WHERE` predicate
    fn binds(&self) -> (Option<Uuid>, Option<Uuid>) {
        match self {
            StudentScope::College(id) => (Some(*id), None),
            StudentScope::Agency(id) => (None, Some(*id)),
        }
    }
}

// ============================================================================
// Database Row Types
// ============================================================================

#[derive(Debug, sqlx::FromRow)]
struct StudentRow {
    id: Uuid,
    college_id: Uuid,
    agency_id: Option<Uuid>,
    roll_no: String,
    first_name: String,
    last_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    branch: String,
    batch_year: i32,
    cgpa: sqlx::types::Decimal,
    backlogs: i32,
    skills: serde_json::Value,
    resume_url: Option<String>,
    placed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<StudentRow> for StudentResponse {
    fn from(r: StudentRow) -> Self {
        let skills: Vec<String> = serde_json::from_value(r.skills).unwrap_or_default();
        Self {
            id: r.id,
            college_id: r.college_id,
            agency_id: r.agency_id,
            roll_no: r.roll_no,
            first_name: r.first_name,
            last_name: r.last_name,
            email: r.email,
            phone: r.phone,
            branch: r.branch,
            batch_year: r.batch_year,
            cgpa: decimal_to_f64(r.cgpa),
            backlogs: r.backlogs,
            skills,
            resume_url: r.resume_url,
            placed: r.placed,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

const STUDENT_SELECT: &str = r#"
    SELECT id, college_id, agency_id, roll_no, first_name, last_name, email, phone,
           branch, batch_year, cgpa, backlogs, skills, resume_url, placed,
           created_at, updated_at
    FROM students
"#;

// ============================================================================
// CRUD
// ============================================================================

#[derive(Debug, Deserialize, Default)]
pub struct StudentQueryParams {
    #[serde(flatten)]
    pub pagination: PaginationParams,
    #[serde(flatten)]
    pub filter: StudentQuery,
}

/// GET /students
///
/// List students in the caller's roster with filtering and pagination.
pub async fn list_students(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StudentQueryParams>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let scope = scope_for(&state, &auth).await?;
    let (college_id, agency_id) = scope.binds();
    let (limit, offset) = query.pagination.window();

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM students
        WHERE ($1::uuid IS NULL OR college_id = $1)
        AND ($2::uuid IS NULL OR agency_id = $2)
        AND ($3::text IS NULL OR branch ILIKE $3)
        AND ($4::int IS NULL OR batch_year = $4)
        AND ($5::numeric IS NULL OR cgpa >= $5)
        AND ($6::bool IS NULL OR placed = $6)
        AND ($7::text IS NULL OR first_name || ' ' || COALESCE(last_name, '') ILIKE '%' || $7 || '%' OR roll_no ILIKE '%' || $7 || '%')
        "#,
    )
    .bind(college_id)
    .bind(agency_id)
    .bind(&query.filter.branch)
    .bind(query.filter.batch_year)
    .bind(query.filter.min_cgpa)
    .bind(query.filter.placed)
    .bind(&query.filter.search)
    .fetch_one(&state.db)
    .await?;

    let rows = sqlx::query_as::<_, StudentRow>(&format!(
        r#"{STUDENT_SELECT}
        WHERE ($1::uuid IS NULL OR college_id = $1)
        AND ($2::uuid IS NULL OR agency_id = $2)
        AND ($3::text IS NULL OR branch ILIKE $3)
        AND ($4::int IS NULL OR batch_year = $4)
        AND ($5::numeric IS NULL OR cgpa >= $5)
        AND ($6::bool IS NULL OR placed = $6)
        AND ($7::text IS NULL OR first_name || ' ' || COALESCE(last_name, '') ILIKE '%' || $7 || '%' OR roll_no ILIKE '%' || $7 || '%')
        ORDER BY roll_no
        LIMIT $8 OFFSET $9
        "#
    ))
    .bind(college_id)
    .bind(agency_id)
    .bind(&query.filter.branch)
    .bind(query.filter.batch_year)
    .bind(query.filter.min_cgpa)
    .bind(query.filter.placed)
    .bind(&query.filter.search)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.db)
    .await?;

    let data: Vec<StudentResponse> = rows.into_iter().map(Into::into).collect();

    Ok(Paginated::new(data, &query.pagination, total as u64))
}

/// POST /students
pub async fn create_student(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
    Json(input): Json<CreateStudentInput>,
) -> Result<impl IntoResponse, ApiError> {
    let scope = scope_for(&state, &auth).await?;

    let (college_id, agency_id) = match scope {
        StudentScope::College(id) => (id, None),
        StudentScope::Agency(id) => {
            let college_id = input
                .college_id
                .ok_or_else(|| ApiError::bad_request("college_id is required"))?;
            (college_id, Some(id))
        }
    };

    if !(0.0..=10.0).contains(&input.cgpa) {
        return Err(ApiError::bad_request("CGPA must be between 0 and 10"));
    }

    let id = Uuid::new_v4();
    let skills = serde_json::to_value(&input.skills).unwrap_or(serde_json::json!([]));

    let result = sqlx::query(
        r#"
        INSERT INTO students (
            id, college_id, agency_id, roll_no, first_name, last_name, email, phone,
            branch, batch_year, cgpa, backlogs, skills, resume_url
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        "#,
    )
    .bind(id)
    .bind(college_id)
    .bind(agency_id)
    .bind(input.roll_no.trim())
    .bind(&input.first_name)
    .bind(&input.last_name)
    .bind(&input.email)
    .bind(&input.phone)
    .bind(&input.branch)
    .bind(input.batch_year)
    .bind(input.cgpa)
    .bind(input.backlogs)
    .bind(&skills)
    .bind(&input.resume_url)
    .execute(&state.db)
    .await;

    if let Err(e) = result {
        if is_unique_violation(&e) {
            return Err(ApiError::conflict(
                "A student with this roll number already exists",
            ));
        }
        return Err(e.into());
    }

    Ok(Created(serde_json::json!({ "id": id, "success": true })))
}

/// GET /students/:id
pub async fn get_student(
    State(state): State<Arc<AppState>>,
    Path(student_id): Path<Uuid>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let scope = scope_for(&state, &auth).await?;
    let (college_id, agency_id) = scope.binds();

    let row = sqlx::query_as::<_, StudentRow>(&format!(
        r#"{STUDENT_SELECT}
        WHERE id = $1
        AND ($2::uuid IS NULL OR college_id = $2)
        AND ($3::uuid IS NULL OR agency_id = $3)
        "#
    ))
    .bind(student_id)
    .bind(college_id)
    .bind(agency_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::not_found("Student not found"))?;

    Ok(Json(DataResponse::new(StudentResponse::from(row))))
}

/// PUT /students/:id
pub async fn update_student(
    State(state): State<Arc<AppState>>,
    Path(student_id): Path<Uuid>,
    auth: RequireAuth,
    Json(input): Json<UpdateStudentInput>,
) -> Result<impl IntoResponse, ApiError> {
    let scope = scope_for(&state, &auth).await?;
    let (college_id, agency_id) = scope.binds();

    if let Some(cgpa) = input.cgpa {
        if !(0.0..=10.0).contains(&cgpa) {
            return Err(ApiError::bad_request("CGPA must be between 0 and 10"));
        }
    }

    let skills = input
        .skills
        .map(|s| serde_json::to_value(s).unwrap_or(serde_json::json!([])));

    let result = sqlx::query(
        r#"
        UPDATE students SET
            first_name = COALESCE($1, first_name),
            last_name = COALESCE($2, last_name),
            email = COALESCE($3, email),
            phone = COALESCE($4, phone),
            branch = COALESCE($5, branch),
            batch_year = COALESCE($6, batch_year),
            cgpa = COALESCE($7, cgpa),
            backlogs = COALESCE($8, backlogs),
            skills = COALESCE($9, skills),
            resume_url = COALESCE($10, resume_url),
            placed = COALESCE($11, placed),
            updated_at = NOW()
        WHERE id = $12
        AND ($13::uuid IS NULL OR college_id = $13)
        AND ($14::uuid IS NULL OR agency_id = $14)
        "#,
    )
    .bind(&input.first_name)
    .bind(&input.last_name)
    .bind(&input.email)
    .bind(&input.phone)
    .bind(&input.branch)
    .bind(input.batch_year)
    .bind(input.cgpa)
    .bind(input.backlogs)
    .bind(skills)
    .bind(&input.resume_url)
    .bind(input.placed)
    .bind(student_id)
    .bind(college_id)
    .bind(agency_id)
    .execute(&state.db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Student not found"));
    }

    Ok(Json(serde_json::json!({ "success": true })))
}

/// DELETE /students/:id
pub async fn delete_student(
    State(state): State<Arc<AppState>>,
    Path(student_id): Path<Uuid>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let scope = scope_for(&state, &auth).await?;
    let (college_id, agency_id) = scope.binds();

    let result = sqlx::query(
        r#"
        DELETE FROM students
        WHERE id = $1
        AND ($2::uuid IS NULL OR college_id = $2)
        AND ($3::uuid IS NULL OR agency_id = $3)
        "#,
    )
    .bind(student_id)
    .bind(college_id)
    .bind(agency_id)
    .execute(&state.db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Student not found"));
    }

    Ok(Json(serde_json::json!({ "success": true })))
}

// ============================================================================
// Bulk import
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ImportReport {
    pub total_rows: usize,
    pub imported: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: Vec<RowError>,
}

/// POST /students/import
///
/// Multipart upload of a CSV or XLSX sheet. Rows upsert on roll number;
/// unmappable rows are reported in the response, never fatal.
pub async fn import_students(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let college_id = match scope_for(&state, &auth).await? {
        StudentScope::College(id) => id,
        StudentScope::Agency(_) => {
            return Err(ApiError::forbidden("Bulk import is available to colleges"));
        }
    };

    let mut payload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid upload: {}", e)))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("upload.csv").to_lowercase();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?;
            payload = Some((filename, bytes.to_vec()));
            break;
        }
    }

    let (filename, bytes) = payload
        .ok_or_else(|| ApiError::bad_request("Multipart field 'file' is required"))?;

    let sheet = if filename.ends_with(".xlsx") {
        ingest::parse_xlsx(&bytes)
    } else {
        ingest::parse_csv(bytes.as_slice())
    }
    .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let total_rows = sheet.rows.len() + sheet.errors.len();
    let mut report = ImportReport {
        total_rows,
        imported: 0,
        updated: 0,
        skipped: sheet.errors.len(),
        errors: sheet.errors,
    };

    for row in sheet.rows {
        match upsert_student(&state, college_id, &row).await {
            Ok(true) => report.imported += 1,
            Ok(false) => report.updated += 1,
            Err(e) => {
                tracing::warn!(error = %e, roll_no = %row.roll_no, "Import row failed");
                report.skipped += 1;
                report.errors.push(RowError {
                    row: 0,
                    message: format!("{}: could not be saved", row.roll_no),
                });
            }
        }
    }

    activity::record(
        &state.db,
        Some(auth.user_id),
        "students_imported",
        "college",
        Some(college_id),
        Some(&format!(
            "{} created, {} updated, {} skipped",
            report.imported, report.updated, report.skipped
        )),
    )
    .await;

    notifications::notify_import_completed(
        &state.db,
        auth.user_id,
        report.imported,
        report.updated,
        report.skipped,
    )
    .await
    .ok();

    let settings = platform::load(&state.db).await;
    if settings.email_enabled {
        let organization: Option<String> =
            sqlx::query_scalar("SELECT name FROM colleges WHERE id = $1")
                .bind(college_id)
                .fetch_optional(&state.db)
                .await?;
        let (subject, body) = email::import_summary(
            &state.settings.service_name,
            organization.as_deref().unwrap_or("there"),
            report.imported,
            report.updated,
            report.skipped,
        );
        state.mailer.send(&auth.email, &subject, body);
    }

    tracing::info!(
        college_id = %college_id,
        imported = report.imported,
        updated = report.updated,
        skipped = report.skipped,
        "Student import finished"
    );

    Ok(Json(DataResponse::new(report)))
}

/// Insert or update one imported row. Returns true when a new record was created.
async fn upsert_student(
    state: &AppState,
    college_id: Uuid,
    row: &StudentImportRow,
) -> Result<bool, sqlx::Error> {
    let existing: Option<Uuid> =
        sqlx::query_scalar("SELECT id FROM students WHERE college_id = $1 AND roll_no = $2")
            .bind(college_id)
            .bind(&row.roll_no)
            .fetch_optional(&state.db)
            .await?;

    let skills = serde_json::to_value(&row.skills).unwrap_or(serde_json::json!([]));

    match existing {
        Some(id) => {
            sqlx::query(
                r#"
                UPDATE students SET
                    first_name = $1,
                    last_name = $2,
                    email = COALESCE($3, email),
                    phone = COALESCE($4, phone),
                    branch = $5,
                    batch_year = $6,
                    cgpa = $7,
                    backlogs = $8,
                    skills = CASE WHEN $9::jsonb = '[]'::jsonb THEN skills ELSE $9 END,
                    resume_url = COALESCE($10, resume_url),
                    updated_at = NOW()
                WHERE id = $11
                "#,
            )
            .bind(&row.first_name)
            .bind(&row.last_name)
            .bind(&row.email)
            .bind(&row.phone)
            .bind(&row.branch)
            .bind(row.batch_year)
            .bind(row.cgpa)
            .bind(row.backlogs)
            .bind(&skills)
            .bind(&row.resume_url)
            .bind(id)
            .execute(&state.db)
            .await?;
            Ok(false)
        }
        None => {
            sqlx::query(
                r#"
                INSERT INTO students (
                    id, college_id, roll_no, first_name, last_name, email, phone,
                    branch, batch_year, cgpa, backlogs, skills, resume_url
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(college_id)
            .bind(&row.roll_no)
            .bind(&row.first_name)
            .bind(&row.last_name)
            .bind(&row.email)
            .bind(&row.phone)
            .bind(&row.branch)
            .bind(row.batch_year)
            .bind(row.cgpa)
            .bind(row.backlogs)
            .bind(&skills)
            .bind(&row.resume_url)
            .execute(&state.db)
            .await?;
            Ok(true)
        }
    }
}

// ============================================================================
// Export
// ============================================================================

#[derive(Debug, Deserialize, Default)]
pub struct ExportQueryParams {
    #[serde(flatten)]
    pub filter: StudentQuery,
    pub format: Option<String>,
}

/// GET /students/export
///
/// Download the caller's roster as CSV (default) or XLSX (`?format=xlsx`).
pub async fn export_students(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ExportQueryParams>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let scope = scope_for(&state, &auth).await?;
    let (college_id, agency_id) = scope.binds();

    let rows = sqlx::query_as::<_, StudentRow>(&format!(
        r#"{STUDENT_SELECT}
        WHERE ($1::uuid IS NULL OR college_id = $1)
        AND ($2::uuid IS NULL OR agency_id = $2)
        AND ($3::text IS NULL OR branch ILIKE $3)
        AND ($4::int IS NULL OR batch_year = $4)
        AND ($5::numeric IS NULL OR cgpa >= $5)
        AND ($6::bool IS NULL OR placed = $6)
        ORDER BY roll_no
        "#
    ))
    .bind(college_id)
    .bind(agency_id)
    .bind(&query.filter.branch)
    .bind(query.filter.batch_year)
    .bind(query.filter.min_cgpa)
    .bind(query.filter.placed)
    .fetch_all(&state.db)
    .await?;

    let students: Vec<StudentResponse> = rows.into_iter().map(Into::into).collect();

    let (bytes, content_type, filename) = match query.format.as_deref() {
        Some("xlsx") => (
            ingest::export::students_xlsx(&students)
                .map_err(|e| ApiError::internal(format!("Failed to build XLSX: {}", e)))?,
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            "students.xlsx",
        ),
        _ => (
            ingest::export::students_csv(&students)
                .map_err(|e| ApiError::internal(format!("Failed to build CSV: {}", e)))?,
            "text/csv",
            "students.csv",
        ),
    };

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    ))
}
