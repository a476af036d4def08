use crate::model::{DutySlot, LeaveBook, Roster, SlotKind, Staff};
use crate::scheduler::StaffAudit;
use anyhow::{bail, Context};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::fs;
use std::path::Path;

/// Colonnes d'éligibilité du tableau du personnel, dans l'ordre attendu.
const STAFF_COLUMNS: [(&str, SlotKind); 7] = [
    ("tier1", SlotKind::Tier1),
    ("tier2", SlotKind::Tier2),
    ("tier3", SlotKind::Tier3),
    ("passive", SlotKind::Passive),
    ("elot", SlotKind::Elot),
    ("minor_ot", SlotKind::MinorOt),
    ("wound", SlotKind::Wound),
];

/// Import du personnel: header `name,tier1,tier2,tier3,passive,elot,minor_ot,wound`.
///
/// Les colonnes sont repérées par leur nom (casse ignorée) ; une colonne
/// absente vaut « non éligible ».
pub fn import_staff_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Staff>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let headers = rdr.headers()?.clone();
    let name_col = column(&headers, "name").context("missing name column")?;
    let columns: Vec<(usize, SlotKind)> = STAFF_COLUMNS
        .iter()
        .filter_map(|(header, kind)| column(&headers, header).map(|idx| (idx, *kind)))
        .collect();

    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let name = rec.get(name_col).unwrap_or("").trim();
        if name.is_empty() {
            continue;
        }
        let mut staff = Staff::new(name);
        for (idx, kind) in &columns {
            if rec.get(*idx).map_or(false, is_marked) {
                staff.eligible.insert(*kind);
            }
        }
        out.push(staff);
    }
    Ok(out)
}

fn column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
}

/// Case cochée : non vide et pas un marqueur négatif.
fn is_marked(cell: &str) -> bool {
    let cell = cell.trim();
    if cell.is_empty() {
        return false;
    }
    !matches!(
        cell.to_ascii_lowercase().as_str(),
        "no" | "n" | "false" | "0" | "non" | "-"
    )
}

/// Import des congés: header `date,name,kind` avec `kind` parmi
/// `absent|leave|restricted|no_oncall`.
pub fn import_leave_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<LeaveBook> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut book = LeaveBook::new();
    for rec in rdr.records() {
        let rec = rec?;
        let date = rec.get(0).context("missing date")?.trim();
        let name = rec.get(1).context("missing name")?.trim();
        let kind = rec.get(2).context("missing kind")?.trim();
        if name.is_empty() {
            bail!("invalid leave row (empty name) on {date}");
        }
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .with_context(|| format!("invalid date: {date}"))?;
        match kind.to_ascii_lowercase().as_str() {
            "absent" | "leave" => book.mark_absent(date, name),
            "restricted" | "no_oncall" => book.mark_restricted(date, name),
            other => bail!("unknown leave kind {other} for {name} on {date}"),
        }
    }
    Ok(book)
}

/// Export JSON du tableau (jolie mise en forme)
pub fn export_roster_json<P: AsRef<Path>>(path: P, roster: &Roster) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(roster)?;
    fs::write(path, s)?;
    Ok(())
}

/// Export CSV du tableau: header `Date,DayName,IsSpecial,<un poste par colonne>`
pub fn export_roster_csv<P: AsRef<Path>>(path: P, roster: &Roster) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    let mut header = vec!["Date", "DayName", "IsSpecial"];
    header.extend(DutySlot::ALL.iter().map(|s| s.column()));
    w.write_record(&header)?;
    for day in &roster.days {
        let date = day.date.to_string();
        let mut rec = vec![date.as_str(), day.day_name.as_str(), bool_cell(day.is_special)];
        rec.extend(DutySlot::ALL.iter().map(|s| day.get(*s).unwrap_or("")));
        w.write_record(&rec)?;
    }
    w.flush()?;
    Ok(())
}

fn bool_cell(b: bool) -> &'static str {
    if b {
        "true"
    } else {
        "false"
    }
}

/// Export CSV du bilan par personne.
pub fn export_audit_csv<P: AsRef<Path>>(path: P, audit: &[StaffAudit]) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record([
        "name",
        "tier1",
        "tier2",
        "tier3",
        "on_call_total",
        "special_on_call",
        "passive",
        "elot",
        "minor_ot",
        "wound",
    ])?;
    for row in audit {
        let counts = [
            row.tier1,
            row.tier2,
            row.tier3,
            row.on_call_total,
            row.special_on_call,
            row.passive,
            row.elot,
            row.minor_ot,
            row.wound,
        ];
        let mut rec = vec![row.name.clone()];
        rec.extend(counts.iter().map(u32::to_string));
        w.write_record(&rec)?;
    }
    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::is_marked;

    #[test]
    fn marker_cells() {
        assert!(is_marked("Yes"));
        assert!(is_marked("x"));
        assert!(is_marked(" oui "));
        assert!(!is_marked(""));
        assert!(!is_marked("No"));
        assert!(!is_marked("0"));
    }
}
