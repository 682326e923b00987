//! Column layouts of the vendor CSV exports.
//!
//! Neither vendor documents its export, and neither export is validated by
//! header name: every field is read from a fixed position. Adding a vendor
//! starts with a new `ColumnSchema` here.

/// How a vendor writes numbers in its money and odometer columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberStyle {
    /// Formatted with the user's currency conventions (symbols, grouping,
    /// possibly a comma decimal separator).
    Localized,
    /// Bare decimal text.
    Plain,
}

/// One labelled fragment of the composite comments text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteField {
    pub label: Option<&'static str>,
    pub column: usize,
}

const fn note(label: &'static str, column: usize) -> NoteField {
    NoteField {
        label: Some(label),
        column,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSchema {
    pub name: &'static str,
    /// Column holding the record type; `None` when every row is a fillup.
    pub record_type: Option<usize>,
    pub date: usize,
    /// Column holding the time of day when the vendor splits it from the date.
    pub time: Option<usize>,
    /// chrono layouts tried in order until one parses.
    pub date_layouts: &'static [&'static str],
    pub vehicle: usize,
    pub odometer: usize,
    pub tank_full: usize,
    /// Exact cell text meaning the tank was filled.
    pub tank_full_marker: &'static str,
    pub unit_price: usize,
    pub quantity: usize,
    pub total_cost: usize,
    pub number_style: NumberStyle,
    /// Columns making up the filling station text, in display order.
    pub station: &'static [usize],
    /// Rendered one per line as `Label:value`. Every label gets the colon,
    /// `Location` included, so the line reads `Location:Main St` and never
    /// `LocationMain St`.
    pub fillup_notes: &'static [NoteField],
    pub expense_notes: &'static [NoteField],
    pub expense_type: Option<usize>,
}

impl ColumnSchema {
    /// Minimum number of fields a record needs for every lookup to be in range.
    pub fn width(&self) -> usize {
        let fixed = [
            self.date,
            self.vehicle,
            self.odometer,
            self.tank_full,
            self.unit_price,
            self.quantity,
            self.total_cost,
        ];
        let optional = [self.record_type, self.time, self.expense_type];
        fixed
            .into_iter()
            .chain(optional.into_iter().flatten())
            .chain(self.station.iter().copied())
            .chain(self.fillup_notes.iter().map(|n| n.column))
            .chain(self.expense_notes.iter().map(|n| n.column))
            .max()
            .map_or(0, |max| max + 1)
    }
}

pub const FUELLY: ColumnSchema = ColumnSchema {
    name: "Fuelly",
    record_type: Some(0),
    date: 2,
    time: Some(3),
    date_layouts: &["%Y-%m-%d %H:%M", "%Y-%m-%d %I:%M %p"],
    vehicle: 4,
    odometer: 5,
    tank_full: 6,
    tank_full_marker: "Full",
    unit_price: 7,
    quantity: 8,
    total_cost: 9,
    number_style: NumberStyle::Localized,
    station: &[12],
    fillup_notes: &[
        note("Octane", 10),
        note("Gas Brand", 11),
        note("Location", 12),
        note("Tags", 13),
        note("Payment Type", 14),
        note("Tire Pressure", 15),
        note("Notes", 16),
        note("MPG", 1),
    ],
    expense_notes: &[note("Tags", 13), note("Payment Type", 14), note("Notes", 16)],
    expense_type: Some(17),
};

pub const GASBUDDY: ColumnSchema = ColumnSchema {
    name: "GasBuddy",
    record_type: None,
    date: 0,
    time: None,
    date_layouts: &["%Y-%m-%d %H:%M:%S"],
    vehicle: 12,
    odometer: 14,
    tank_full: 17,
    tank_full_marker: "Yes",
    unit_price: 13,
    quantity: 10,
    total_cost: 7,
    number_style: NumberStyle::Plain,
    // name, then address parts
    station: &[1, 2, 3, 4, 5],
    // the station link, unlabelled
    fillup_notes: &[NoteField {
        label: None,
        column: 2,
    }],
    expense_notes: &[],
    expense_type: None,
};
