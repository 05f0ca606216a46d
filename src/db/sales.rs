use crate::db::enum_column;
use crate::domain::{Client, Sale, SaleStatus};
use crate::errors::ServerError;
use rusqlite::{params, Connection, Row};

const SALE_COLUMNS: &str = "id, client_id, second_buyer_id, development_id, broker_id, \
    block_number, lot_number, total_value, commission_value, purchase_date, status, updated_at";

fn sale_from_row(row: &Row<'_>) -> rusqlite::Result<Sale> {
    Ok(Sale {
        id: row.get(0)?,
        client_id: row.get(1)?,
        second_buyer_id: row.get(2)?,
        development_id: row.get(3)?,
        broker_id: row.get(4)?,
        block_number: row.get(5)?,
        lot_number: row.get(6)?,
        total_value: row.get(7)?,
        commission_value: row.get(8)?,
        purchase_date: row.get(9)?,
        status: enum_column(10, row.get(10)?, SaleStatus::parse)?,
        updated_at: row.get(11)?,
    })
}

fn client_from_row(row: &Row<'_>) -> rusqlite::Result<Client> {
    Ok(Client {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        cpf: row.get(3)?,
        phone: row.get(4)?,
        address: row.get(5)?,
    })
}

/// Newest purchases first.
pub fn list_sales(conn: &Connection) -> Result<Vec<Sale>, ServerError> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {SALE_COLUMNS} FROM sales ORDER BY purchase_date DESC, id"
        ))
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let rows = stmt
        .query_map([], sale_from_row)
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r.map_err(|e| ServerError::DbError(e.to_string()))?);
    }
    Ok(out)
}

pub fn insert_sale(conn: &Connection, sale: &Sale) -> Result<(), ServerError> {
    conn.execute(
        &format!(
            "INSERT INTO sales ({SALE_COLUMNS}) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
        ),
        params![
            sale.id,
            sale.client_id,
            sale.second_buyer_id,
            sale.development_id,
            sale.broker_id,
            sale.block_number,
            sale.lot_number,
            sale.total_value,
            sale.commission_value,
            sale.purchase_date,
            sale.status.as_str(),
            sale.updated_at,
        ],
    )
    .map_err(|e| ServerError::DbError(format!("insert sale failed: {e}")))?;
    Ok(())
}

pub fn list_clients(conn: &Connection) -> Result<Vec<Client>, ServerError> {
    let mut stmt = conn
        .prepare("SELECT id, name, email, cpf, phone, address FROM clients ORDER BY name")
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let rows = stmt
        .query_map([], client_from_row)
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r.map_err(|e| ServerError::DbError(e.to_string()))?);
    }
    Ok(out)
}

pub fn insert_client(conn: &Connection, client: &Client) -> Result<(), ServerError> {
    conn.execute(
        "INSERT INTO clients (id, name, email, cpf, phone, address) VALUES (?, ?, ?, ?, ?, ?)",
        params![
            client.id,
            client.name,
            client.email,
            client.cpf,
            client.phone,
            client.address,
        ],
    )
    .map_err(|e| ServerError::DbError(format!("insert client failed: {e}")))?;
    Ok(())
}
