use crate::infra::{open_service, parse_date, parse_kind, role_context, role_writer};
use attendance::config::StorageConfig;
use attendance::error::AppError;
use attendance::workflows::arrival::ArrivalClock;
use attendance::workflows::leave::export::{display_date, COLUMN_WIDTHS, HEADER};
use attendance::workflows::leave::{
    export, ExportDocument, LeaveKind, LeaveRecord, LeaveRecordService, RecordDraft, RecordId,
    RecordStore, Role, RoleContext,
};
use chrono::{Local, NaiveDate};
use clap::{Args, ValueEnum};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct AddArgs {
    /// Full name of the employee
    #[arg(long, default_value = "")]
    pub(crate) employee: String,
    /// incapacidad or permiso
    #[arg(long, value_parser = parse_kind, default_value = "incapacidad")]
    pub(crate) kind: LeaveKind,
    /// Day of the absence (YYYY-MM-DD), not later than today
    #[arg(long, value_parser = parse_date)]
    pub(crate) date: Option<NaiveDate>,
    /// Details of the incapacity or permission
    #[arg(long, default_value = "")]
    pub(crate) justification: String,
}

#[derive(Args, Debug)]
pub(crate) struct DeleteArgs {
    /// Id shown by `records list`
    pub(crate) id: u64,
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    /// Directory for the generated file (defaults to APP_EXPORT_DIR)
    #[arg(long)]
    pub(crate) out_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct LoginArgs {
    #[arg(long, value_enum)]
    pub(crate) role: RoleArg,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum RoleArg {
    Admin,
    Employee,
}

impl From<RoleArg> for Role {
    fn from(value: RoleArg) -> Self {
        match value {
            RoleArg::Admin => Role::Admin,
            RoleArg::Employee => Role::Employee,
        }
    }
}

pub(crate) fn show_arrival() {
    println!("Hora de llegada registrada: {}", ArrivalClock.now());
}

pub(crate) fn add_record(storage: &StorageConfig, args: AddArgs) -> Result<(), AppError> {
    let draft = RecordDraft {
        employee_name: args.employee,
        kind: args.kind,
        date: args.date,
        justification: args.justification,
    };

    let mut service = open_service(storage);
    let record = service.create(&draft)?;
    println!("Registro guardado exitosamente (id {})", record.id());
    Ok(())
}

pub(crate) fn list_records(storage: &StorageConfig) -> Result<(), AppError> {
    println!("{}", review_listing(&open_service(storage))?);
    Ok(())
}

const NO_RECORDS: &str = "No hay registros disponibles";
const ID_WIDTH: usize = 15;

fn require_admin(role: Role, action: &'static str) -> Result<(), AppError> {
    if role.is_admin() {
        Ok(())
    } else {
        Err(AppError::AdminOnly { action })
    }
}

/// Admin review of every record, or the empty-state message.
fn review_listing<S, C>(service: &LeaveRecordService<S, C>) -> Result<String, AppError>
where
    S: RecordStore + 'static,
    C: RoleContext + 'static,
{
    require_admin(service.current_role(), "ver los registros")?;
    if service.list().is_empty() {
        return Ok(NO_RECORDS.to_string());
    }
    Ok(format!(
        "Registros de Incapacidades y Permisos\n{}",
        render_table(service.list())
    ))
}

pub(crate) fn delete_record(storage: &StorageConfig, args: DeleteArgs) -> Result<(), AppError> {
    let mut service = open_service(storage);
    let removed = service.delete(RecordId(args.id))?;
    println!(
        "Registro eliminado exitosamente ({} - {})",
        removed.employee_name(),
        removed.kind().label()
    );
    Ok(())
}

pub(crate) fn export_records(storage: &StorageConfig, args: ExportArgs) -> Result<(), AppError> {
    let document = export_document(&open_service(storage))?;
    let directory = args.out_dir.unwrap_or_else(|| storage.export_dir.clone());
    let path = document.write_to(&directory, Local::now().date_naive())?;
    println!(
        "Archivo generado exitosamente: {} ({} filas)",
        path.display(),
        document.rows.len()
    );
    Ok(())
}

fn export_document<S, C>(service: &LeaveRecordService<S, C>) -> Result<ExportDocument, AppError>
where
    S: RecordStore + 'static,
    C: RoleContext + 'static,
{
    require_admin(service.current_role(), "exportar los registros")?;
    Ok(export(service.list())?)
}

pub(crate) fn login(storage: &StorageConfig, args: LoginArgs) -> Result<(), AppError> {
    let role = Role::from(args.role);
    role_writer(storage).write(role)?;
    println!("Sesión iniciada como {role}");
    Ok(())
}

pub(crate) fn show_session(storage: &StorageConfig) {
    println!("Rol actual: {}", role_context(storage).current_role());
}

/// Each column is as wide as its hint or its longest cell, whichever is larger.
fn render_table(records: &[LeaveRecord]) -> String {
    let mut rows = vec![[
        "Id".to_string(),
        HEADER[0].to_string(),
        HEADER[1].to_string(),
        HEADER[2].to_string(),
        HEADER[3].to_string(),
    ]];
    rows.extend(records.iter().map(|record| {
        [
            record.id().to_string(),
            record.employee_name().to_string(),
            record.kind().label().to_string(),
            display_date(record.date()),
            record.justification().to_string(),
        ]
    }));

    let [employee, kind, date, _] = COLUMN_WIDTHS.map(usize::from);
    let mut widths = [ID_WIDTH, employee, kind, date, 0];
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    rows.iter()
        .map(|row| {
            let line: Vec<String> = row
                .iter()
                .zip(widths)
                .map(|(cell, width)| format!("{cell:<width$}"))
                .collect();
            line.join(" ").trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
