use crate::domain::{CallCounters, CallModeSession, Development, User};
use crate::errors::ServerError;
use crate::reports::aggregate::{percent, ReportTotals};
use rust_xlsxwriter::{Format, Workbook, Worksheet};

fn xlsx_err(what: &str) -> impl Fn(rust_xlsxwriter::XlsxError) -> ServerError + '_ {
    move |e| ServerError::XlsxError(format!("Failed to write {what}: {e}"))
}

/// Workbook with a totals sheet and one row per session.
pub fn report_workbook(
    totals: &ReportTotals,
    sessions: &[&CallModeSession],
    users: &[User],
    developments: &[Development],
) -> Result<Vec<u8>, ServerError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    write_totals(workbook.add_worksheet(), totals, &bold)?;
    write_sessions(workbook.add_worksheet(), sessions, users, developments, &bold)?;

    workbook
        .save_to_buffer()
        .map_err(|e| ServerError::XlsxError(format!("Failed to save workbook: {e}")))
}

fn write_totals(
    ws: &mut Worksheet,
    totals: &ReportTotals,
    bold: &Format,
) -> Result<(), ServerError> {
    ws.set_name("Totals").map_err(xlsx_err("sheet name"))?;

    let mut rows: Vec<(&str, String)> = vec![
        ("Sessions", totals.sessions.to_string()),
        ("Calls", totals.attempts.to_string()),
        ("Outcomes counted", totals.counters.total().to_string()),
    ];
    rows.extend(
        totals
            .counters
            .entries()
            .iter()
            .map(|(label, value)| (*label, value.to_string())),
    );
    rows.push(("Answer rate", percent(totals.answer_rate())));
    rows.push(("Talk rate", percent(totals.talk_rate())));
    rows.push(("Schedule rate", percent(totals.schedule_rate())));

    for (i, (label, value)) in rows.iter().enumerate() {
        let r = i as u32;
        ws.write_string_with_format(r, 0, *label, bold)
            .map_err(xlsx_err("label"))?;
        ws.write_string(r, 1, value).map_err(xlsx_err("total"))?;
    }
    Ok(())
}

fn write_sessions(
    ws: &mut Worksheet,
    sessions: &[&CallModeSession],
    users: &[User],
    developments: &[Development],
    bold: &Format,
) -> Result<(), ServerError> {
    ws.set_name("Sessions").map_err(xlsx_err("sheet name"))?;

    let mut headers = vec!["Start", "End", "User", "Development", "Calls"];
    headers.extend(CallCounters::default().entries().map(|(label, _)| label));

    for (col, header) in headers.iter().enumerate() {
        ws.write_string_with_format(0, col as u16, *header, bold)
            .map_err(xlsx_err("header"))?;
    }

    for (i, s) in sessions.iter().enumerate() {
        let r = (i + 1) as u32;
        let user = users
            .iter()
            .find(|u| u.id == s.user_id)
            .map_or(s.user_id.as_str(), |u| u.name.as_str());
        let development = s
            .development_id
            .as_deref()
            .map(|id| {
                developments
                    .iter()
                    .find(|d| d.id == id)
                    .map_or(id, |d| d.name.as_str())
            })
            .unwrap_or("");
        let end = s
            .end_time
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();

        ws.write_string(r, 0, s.start_time.format("%Y-%m-%d %H:%M").to_string())
            .map_err(xlsx_err("start"))?;
        ws.write_string(r, 1, end).map_err(xlsx_err("end"))?;
        ws.write_string(r, 2, user).map_err(xlsx_err("user"))?;
        ws.write_string(r, 3, development)
            .map_err(xlsx_err("development"))?;
        ws.write_number(r, 4, s.business_viewed.len() as f64)
            .map_err(xlsx_err("calls"))?;

        for (j, (_, value)) in s.counters.entries().iter().enumerate() {
            ws.write_number(r, (5 + j) as u16, f64::from(*value))
                .map_err(xlsx_err("counter"))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::business::fixtures::ts;

    #[test]
    fn builds_a_zip_container() {
        let session = CallModeSession {
            id: "s1".into(),
            user_id: "u1".into(),
            development_id: Some("d1".into()),
            start_time: ts(1, 10),
            end_time: None,
            business_viewed: vec!["b1".into()],
            counters: CallCounters {
                answered_calls: 1,
                ..Default::default()
            },
        };
        let totals = ReportTotals {
            sessions: 1,
            attempts: 1,
            counters: session.counters,
        };
        let bytes = report_workbook(&totals, &[&session], &[], &[]).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}
