use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use chrono::NaiveDate;

use crate::api::client::{ApiClient, ApiEvent, Endpoint, Payload};
use crate::api::error::ApiError;
use crate::api::types::{
    CalculationRecord, CalculationSummary, Formula, ReportQuery, ReportsResponse,
    ValidationSummary, Variable, default_variables,
};
use crate::api::upload::UploadFile;
use crate::color::ColorMap;
use crate::data::calendar::QuickRange;
use crate::data::filter::{FilterError, FilterOp, FilterSet, FilterSpec, FilterValue};
use crate::data::model::{ColumnInfo, Dataset, Row};
use crate::data::sort::SortSpec;
use crate::data::view::TableView;
use crate::formula::FormulaDraft;

// ---------------------------------------------------------------------------
// Table state: filters, sort, page, hidden columns
// ---------------------------------------------------------------------------

/// Everything the user has set on one table. Replaced wholesale by
/// [`TableState::reduce`], never edited in place.
#[derive(Debug, Clone, PartialEq)]
pub struct TableState {
    filters: FilterSet,
    sort: Option<SortSpec>,
    page: usize,
    hidden_columns: BTreeSet<String>,
}

impl Default for TableState {
    fn default() -> Self {
        Self {
            filters: FilterSet::new(),
            sort: None,
            page: 1,
            hidden_columns: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableAction {
    /// Install a filter; a blank value removes it instead.
    SetFilter {
        column: String,
        op: FilterOp,
        value: FilterValue,
    },
    ClearFilter(String),
    ClearFilters,
    /// `Between` filter covering the last N months up to `today`.
    QuickRange {
        column: String,
        range: QuickRange,
        today: NaiveDate,
    },
    /// New column sorts ascending; the same column again flips direction.
    SortBy(String),
    ClearSort,
    GoToPage(usize),
    ToggleColumn(String),
    ShowAllColumns,
}

impl TableState {
    /// Initial state for freshly uploaded data: columns empty in the first
    /// row start hidden.
    pub fn for_dataset(dataset: &Dataset) -> Self {
        let populated: BTreeSet<String> = dataset.populated_in_first_row().into_iter().collect();
        let hidden_columns = dataset
            .columns()
            .iter()
            .filter(|c| !populated.contains(&c.name))
            .map(|c| c.name.clone())
            .collect();
        Self {
            hidden_columns,
            ..Self::default()
        }
    }

    /// Apply one action. Every filter change lands back on page 1.
    pub fn reduce(&self, dataset: &Dataset, action: TableAction) -> Result<TableState, FilterError> {
        let mut next = self.clone();
        match action {
            TableAction::SetFilter { column, op, value } => {
                if value.is_blank() {
                    next.filters.remove(&column);
                } else {
                    let spec = FilterSpec::new(dataset.column_type(&column), op, value)?;
                    next.filters.insert(column, spec);
                }
                next.page = 1;
            }
            TableAction::ClearFilter(column) => {
                next.filters.remove(&column);
                next.page = 1;
            }
            TableAction::ClearFilters => {
                next.filters.clear();
                next.page = 1;
            }
            TableAction::QuickRange {
                column,
                range,
                today,
            } => {
                let (start, end) = range.ending(today).iso_bounds();
                let spec = FilterSpec::new(
                    dataset.column_type(&column),
                    FilterOp::Between,
                    FilterValue::Range(start, end),
                )?;
                next.filters.insert(column, spec);
                next.page = 1;
            }
            TableAction::SortBy(column) => {
                next.sort = Some(match &self.sort {
                    Some(current) if current.column == column => SortSpec {
                        column,
                        direction: current.direction.flipped(),
                    },
                    _ => SortSpec::ascending(column),
                });
            }
            TableAction::ClearSort => next.sort = None,
            TableAction::GoToPage(page) => next.page = page.max(1),
            TableAction::ToggleColumn(column) => {
                if !next.hidden_columns.remove(&column) {
                    next.hidden_columns.insert(column);
                }
            }
            TableAction::ShowAllColumns => next.hidden_columns.clear(),
        }
        Ok(next)
    }

    pub fn view(&self, dataset: &Dataset) -> TableView {
        TableView::compute(dataset, &self.filters, self.sort.as_ref(), self.page)
    }

    /// Dataset columns minus hidden ones, in dataset order.
    pub fn visible_columns<'a>(&self, dataset: &'a Dataset) -> Vec<&'a ColumnInfo> {
        dataset
            .columns()
            .iter()
            .filter(|c| !self.hidden_columns.contains(&c.name))
            .collect()
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn filter(&self, column: &str) -> Option<&FilterSpec> {
        self.filters.get(column)
    }

    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    /// Requested page. The view clamps it against the row count.
    #[cfg(test)]
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn is_hidden(&self, column: &str) -> bool {
        self.hidden_columns.contains(column)
    }
}

// ---------------------------------------------------------------------------
// Table model: dataset + state + cached view + widget buffers
// ---------------------------------------------------------------------------

/// Text typed into one column's filter widget, before it is committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterInput {
    pub op: FilterOp,
    pub text: String,
    pub min: String,
    pub max: String,
}

impl FilterInput {
    fn for_column(info: Option<&ColumnInfo>) -> Self {
        let op = info
            .and_then(|c| FilterOp::allowed_for(c.kind).first().copied())
            .unwrap_or(FilterOp::Contains);
        Self {
            op,
            text: String::new(),
            min: String::new(),
            max: String::new(),
        }
    }

    pub fn value(&self) -> FilterValue {
        match self.op {
            FilterOp::Between => FilterValue::range(self.min.clone(), self.max.clone()),
            _ => FilterValue::Scalar(self.text.clone()),
        }
    }
}

/// One on-screen table. The view is recomputed whenever the state changes.
#[derive(Debug, Clone)]
pub struct TableModel {
    dataset: Dataset,
    state: TableState,
    view: TableView,
    inputs: BTreeMap<String, FilterInput>,
    /// Why the last filter could not be applied.
    pub filter_error: Option<String>,
}

impl TableModel {
    pub fn new(dataset: Dataset, state: TableState) -> Self {
        let view = state.view(&dataset);
        Self {
            dataset,
            state,
            view,
            inputs: BTreeMap::new(),
            filter_error: None,
        }
    }

    /// Upload-page flavour: sparse columns start hidden.
    pub fn with_sparse_columns_hidden(dataset: Dataset) -> Self {
        let state = TableState::for_dataset(&dataset);
        Self::new(dataset, state)
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn state(&self) -> &TableState {
        &self.state
    }

    pub fn view(&self) -> &TableView {
        &self.view
    }

    pub fn visible_columns(&self) -> Vec<&ColumnInfo> {
        self.state.visible_columns(&self.dataset)
    }

    #[cfg(test)]
    pub fn input(&self, column: &str) -> Option<&FilterInput> {
        self.inputs.get(column)
    }

    pub fn input_mut(&mut self, column: &str) -> &mut FilterInput {
        let info = self.dataset.column(column);
        self.inputs
            .entry(column.to_string())
            .or_insert_with(|| FilterInput::for_column(info))
    }

    /// Commit the widget text of `column` as its filter.
    pub fn apply_input(&mut self, column: &str) -> bool {
        let input = self.input_mut(column);
        let action = TableAction::SetFilter {
            column: column.to_string(),
            op: input.op,
            value: input.value(),
        };
        self.dispatch(action)
    }

    /// Run an action through the reducer. On rejection the previous state
    /// stays and the reason is kept for display.
    pub fn dispatch(&mut self, action: TableAction) -> bool {
        match self.state.reduce(&self.dataset, action.clone()) {
            Ok(next) => {
                self.view = next.view(&self.dataset);
                self.state = next;
                self.filter_error = None;
                self.sync_inputs(&action);
                true
            }
            Err(e) => {
                log::warn!("filter rejected: {e}");
                self.filter_error = Some(e.to_string());
                false
            }
        }
    }

    /// Mirror an applied action into the filter widgets.
    fn sync_inputs(&mut self, action: &TableAction) {
        match action {
            TableAction::ClearFilters => self.inputs.clear(),
            TableAction::ClearFilter(column) => {
                self.inputs.remove(column);
            }
            TableAction::QuickRange {
                column,
                range,
                today,
            } => {
                let (start, end) = range.ending(*today).iso_bounds();
                log::debug!("quick range {} on {column}: {start}..{end}", range.key());
                let input = self.input_mut(column);
                input.op = FilterOp::Between;
                input.min = start;
                input.max = end;
            }
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Home,
    Upload,
    Formulas,
    Calculate,
    Reports,
}

impl Screen {
    pub const ALL: [Screen; 5] = [
        Screen::Home,
        Screen::Upload,
        Screen::Formulas,
        Screen::Calculate,
        Screen::Reports,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Screen::Home => "Home",
            Screen::Upload => "Upload Data",
            Screen::Formulas => "Formulas",
            Screen::Calculate => "Calculate",
            Screen::Reports => "Reports",
        }
    }
}

/// Inline message under a page's controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    fn failed(err: &ApiError) -> Self {
        Notice::Error(err.to_string())
    }
}

#[derive(Debug, Default)]
pub struct UploadPage {
    pub table: Option<TableModel>,
    pub validation: ValidationSummary,
    pub selected: Option<UploadFile>,
    pub notice: Option<Notice>,
}

#[derive(Debug)]
pub struct FormulaPage {
    pub formulas: Vec<Formula>,
    pub variables: Vec<Variable>,
    pub draft: FormulaDraft,
    /// Number being typed for the builder's "add number" button.
    pub number_input: String,
    pub notice: Option<Notice>,
}

impl Default for FormulaPage {
    fn default() -> Self {
        Self {
            formulas: Vec::new(),
            variables: default_variables(),
            draft: FormulaDraft::default(),
            number_input: String::new(),
            notice: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct CalculatePage {
    pub selected_formula: Option<String>,
    pub summary: Option<CalculationSummary>,
    pub results: Option<TableModel>,
    pub notice: Option<Notice>,
}

#[derive(Debug)]
pub struct ReportsPage {
    pub reports: ReportsResponse,
    /// Range of the last request.
    pub query: ReportQuery,
    /// Range being edited in the date pickers.
    pub range_input: ReportQuery,
    /// Bar colour per formula id.
    pub colors: ColorMap,
    pub notice: Option<Notice>,
}

impl Default for ReportsPage {
    fn default() -> Self {
        Self {
            reports: ReportsResponse::default(),
            query: ReportQuery::default(),
            range_input: ReportQuery::default(),
            colors: ColorMap::new(std::iter::empty()),
            notice: None,
        }
    }
}

/// Home page tiles, derived from the calculation history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub calculations_today: usize,
    pub compliant_prices: u64,
    pub non_compliant_prices: u64,
}

impl DashboardStats {
    pub fn from_history(calculations: &[CalculationRecord], today: NaiveDate) -> Self {
        calculations
            .iter()
            .fold(DashboardStats::default(), |mut stats, record| {
                if record.date() == Some(today) {
                    stats.calculations_today += 1;
                }
                stats.compliant_prices += record.compliant_count.unwrap_or(0);
                stats.non_compliant_prices += record.non_compliant_count.unwrap_or(0);
                stats
            })
    }
}

/// The full UI state, independent of rendering.
#[derive(Debug)]
pub struct AppState {
    pub screen: Screen,
    pub api: ApiClient,
    pub upload: UploadPage,
    pub formulas: FormulaPage,
    pub calculate: CalculatePage,
    pub reports: ReportsPage,
}

impl AppState {
    pub fn new(api: ApiClient) -> Self {
        Self {
            screen: Screen::default(),
            api,
            upload: UploadPage::default(),
            formulas: FormulaPage::default(),
            calculate: CalculatePage::default(),
            reports: ReportsPage::default(),
        }
    }

    /// Kick off every initial load.
    pub fn refresh_all(&mut self) {
        self.api.fetch_data();
        self.api.fetch_formulas();
        self.api.fetch_variables();
        self.refresh_reports();
    }

    pub fn refresh_reports(&mut self) {
        let query = self.reports.query;
        self.api.fetch_reports(&query);
    }

    /// Rows the next calculation will be run against.
    pub fn uploaded_rows(&self) -> &[Row] {
        self.upload
            .table
            .as_ref()
            .map(|t| t.dataset().rows())
            .unwrap_or_default()
    }

    pub fn selected_formula(&self) -> Option<&Formula> {
        let id = self.calculate.selected_formula.as_deref()?;
        self.formulas.formulas.iter().find(|f| f.id == id)
    }

    // -- upload ------------------------------------------------------------

    /// Validate and stage a file picked from disk.
    pub fn select_file(&mut self, path: &Path) {
        match UploadFile::from_path(path) {
            Ok(file) => {
                log::info!("selected {} ({} bytes)", file.name(), file.len());
                self.upload.selected = Some(file);
                self.upload.notice = None;
            }
            Err(e) => {
                log::warn!("rejected {}: {e}", path.display());
                self.upload.selected = None;
                self.upload.notice = Some(Notice::Error(e.to_string()));
            }
        }
    }

    pub fn start_upload(&mut self) {
        let Some(file) = self.upload.selected.as_ref() else {
            self.upload.notice = Some(Notice::Error("Please select a file to upload".into()));
            return;
        };
        match self.api.upload(file) {
            Ok(_) => self.upload.notice = None,
            Err(e) => {
                log::warn!("upload blocked: {e}");
                self.upload.notice = Some(Notice::Error(e.to_string()));
            }
        }
    }

    // -- formulas ----------------------------------------------------------

    pub fn submit_formula(&mut self) {
        let request = match self.formulas.draft.to_request() {
            Ok(r) => r,
            Err(e) => {
                self.formulas.notice = Some(Notice::Error(e.to_string()));
                return;
            }
        };
        match self.api.create_formula(&request) {
            Ok(_) => self.formulas.notice = None,
            Err(e) => {
                log::error!("could not build formula request: {e}");
                self.formulas.notice = Some(Notice::failed(&e));
            }
        }
    }

    // -- calculate ---------------------------------------------------------

    pub fn start_calculation(&mut self) {
        let formula_id = match self.calculate.selected_formula.clone() {
            Some(id) if !self.uploaded_rows().is_empty() => id,
            _ => {
                self.calculate.notice = Some(Notice::Error(
                    "Please select a formula and ensure data is uploaded".into(),
                ));
                return;
            }
        };
        let rows = self.uploaded_rows().to_vec();
        match self.api.calculate(&formula_id, &rows) {
            Ok(_) => self.calculate.notice = None,
            Err(e) => {
                log::error!("could not build calculation request: {e}");
                self.calculate.notice = Some(Notice::failed(&e));
            }
        }
    }

    // -- reports -----------------------------------------------------------

    pub fn set_report_range(&mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) {
        self.reports.query = ReportQuery {
            start_date: start,
            end_date: end,
        };
        self.reports.range_input = self.reports.query;
        self.refresh_reports();
    }

    pub fn stats(&self, today: NaiveDate) -> DashboardStats {
        DashboardStats::from_history(&self.reports.reports.calculations, today)
    }

    // -- responses ---------------------------------------------------------

    /// Apply every response that arrived since the last frame.
    pub fn drain_events(&mut self) {
        for event in self.api.poll() {
            self.apply_event(event);
        }
    }

    /// Fold one response into the page it belongs to. A failure only sets
    /// that page's notice; whatever was shown before stays.
    pub fn apply_event(&mut self, event: ApiEvent) {
        let endpoint = event.endpoint;
        let payload = match event.result {
            Ok(payload) => payload,
            Err(err) => {
                self.apply_failure(endpoint, &err);
                return;
            }
        };

        match payload {
            Payload::Data(resp) => {
                let dataset = Dataset::from_rows(resp.data);
                log::info!("{:?}: {} rows, {} columns", endpoint, dataset.len(), dataset.columns().len());
                self.upload.validation = resp.validation_summary;
                self.upload.table = (!dataset.is_empty())
                    .then(|| TableModel::with_sparse_columns_hidden(dataset));
                if endpoint == Endpoint::Upload {
                    self.upload.selected = None;
                    let message = resp
                        .message
                        .unwrap_or_else(|| "File uploaded successfully".into());
                    self.upload.notice = Some(Notice::Success(message));
                }
            }
            Payload::Formulas(formulas) => {
                log::info!("loaded {} formulas", formulas.len());
                if let Some(id) = &self.calculate.selected_formula {
                    if !formulas.iter().any(|f| &f.id == id) {
                        self.calculate.selected_formula = None;
                    }
                }
                self.formulas.formulas = formulas;
            }
            Payload::FormulaCreated(formula) => {
                log::info!("created formula {} ({})", formula.id, formula.name);
                self.formulas.notice =
                    Some(Notice::Success(format!("Formula \"{}\" created", formula.name)));
                self.formulas.draft = FormulaDraft::default();
                self.formulas.formulas.retain(|f| f.id != formula.id);
                self.formulas.formulas.push(formula);
                // Supersedes any list request sent before the create.
                self.api.fetch_formulas();
            }
            Payload::Variables(variables) => {
                if !variables.is_empty() {
                    self.formulas.variables = variables;
                }
            }
            Payload::Calculated(resp) => {
                log::info!(
                    "calculated {} rows with {}",
                    resp.summary.total_processed,
                    resp.summary.formula_name
                );
                self.calculate.summary = Some(resp.summary);
                self.calculate.results = Some(TableModel::new(
                    Dataset::from_rows(resp.results),
                    TableState::default(),
                ));
                self.refresh_reports();
            }
            Payload::Reports(reports) => {
                log::info!("loaded {} report entries", reports.calculations.len());
                self.reports.colors =
                    ColorMap::new(reports.calculations.iter().map(|c| c.formula_id.as_str()));
                self.reports.reports = reports;
                self.reports.notice = None;
            }
        }
    }

    fn apply_failure(&mut self, endpoint: Endpoint, err: &ApiError) {
        // The backend may not list variables at all; the defaults stay.
        if endpoint == Endpoint::Variables {
            log::warn!("variables unavailable, keeping defaults: {err}");
            return;
        }
        log::error!("{endpoint:?} failed: {err}");
        let notice = Some(Notice::failed(err));
        match endpoint {
            Endpoint::Data | Endpoint::Upload => self.upload.notice = notice,
            Endpoint::Formulas | Endpoint::CreateFormula => self.formulas.notice = notice,
            Endpoint::Calculate => self.calculate.notice = notice,
            Endpoint::Reports => self.reports.notice = notice,
            Endpoint::Variables => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::api::client::testing::MockFetcher;
    use crate::data::model::{CellValue, row};
    use crate::data::sort::SortDirection;
    use pretty_assertions::assert_eq;

    fn sales() -> Dataset {
        let rows: Vec<Row> = (0..45)
            .map(|i| {
                let product = format!("Drug{}", i % 3);
                let date = format!("2024-{:02}-15", i % 12 + 1);
                row(&[
                    ("Product", CellValue::from(product.as_str())),
                    ("Date", CellValue::from(date.as_str())),
                    ("Total Sales", CellValue::Number(f64::from(i) * 10.0)),
                    ("Notes", CellValue::Null),
                ])
            })
            .collect();
        Dataset::from_rows(rows)
    }

    fn app() -> (AppState, Arc<MockFetcher>) {
        let _ = env_logger::builder().is_test(true).try_init();
        let fetcher = Arc::new(MockFetcher::default());
        let api = ApiClient::with_fetcher("http://localhost:8000", fetcher.clone());
        (AppState::new(api), fetcher)
    }

    #[test]
    fn filter_changes_reset_the_page() {
        let ds = sales();
        let state = TableState::default()
            .reduce(&ds, TableAction::GoToPage(3))
            .unwrap();
        assert_eq!(state.view(&ds).page(), 3);

        let state = state
            .reduce(
                &ds,
                TableAction::SetFilter {
                    column: "Product".into(),
                    op: FilterOp::Contains,
                    value: "drug1".into(),
                },
            )
            .unwrap();
        assert_eq!(state.page(), 1);
        assert_eq!(state.view(&ds).len(), 15);

        let paged = state.reduce(&ds, TableAction::GoToPage(2)).unwrap();
        let cleared = paged.reduce(&ds, TableAction::ClearFilters).unwrap();
        assert_eq!(cleared.page(), 1);
        assert!(cleared.filters().is_empty());
    }

    #[test]
    fn blank_value_removes_the_filter() {
        let ds = sales();
        let set = |value: &str, state: &TableState| {
            state
                .reduce(
                    &ds,
                    TableAction::SetFilter {
                        column: "Product".into(),
                        op: FilterOp::Equals,
                        value: value.into(),
                    },
                )
                .unwrap()
        };
        let filtered = set("Drug0", &TableState::default());
        assert!(filtered.filter("Product").is_some());
        let removed = set("   ", &filtered);
        assert!(removed.filter("Product").is_none());
        assert_eq!(removed.view(&ds).len(), 45);
    }

    #[test]
    fn rejected_filter_leaves_state_alone() {
        let ds = sales();
        let mut model = TableModel::new(ds, TableState::default());
        let before = model.state().clone();
        assert!(!model.dispatch(TableAction::SetFilter {
            column: "Total Sales".into(),
            op: FilterOp::Contains,
            value: "10".into(),
        }));
        assert_eq!(model.state(), &before);
        assert!(model.filter_error.is_some());

        assert!(model.dispatch(TableAction::SortBy("Product".into())));
        assert!(model.filter_error.is_none());
    }

    #[test]
    fn sort_toggles_on_the_same_column() {
        let ds = sales();
        let s = TableState::default();
        let s = s.reduce(&ds, TableAction::SortBy("Total Sales".into())).unwrap();
        assert_eq!(s.sort().map(|x| x.direction), Some(SortDirection::Ascending));
        let s = s.reduce(&ds, TableAction::SortBy("Total Sales".into())).unwrap();
        assert_eq!(s.sort().map(|x| x.direction), Some(SortDirection::Descending));
        let s = s.reduce(&ds, TableAction::SortBy("Product".into())).unwrap();
        assert_eq!(s.sort(), Some(&SortSpec::ascending("Product")));
        let s = s.reduce(&ds, TableAction::ClearSort).unwrap();
        assert_eq!(s.sort(), None);
    }

    #[test]
    fn quick_range_installs_between_filter() {
        let ds = sales();
        let today = NaiveDate::from_ymd_opt(2024, 4, 15).unwrap();
        let mut model = TableModel::new(ds, TableState::default());
        assert!(model.dispatch(TableAction::QuickRange {
            column: "Date".into(),
            range: QuickRange::Last3Months,
            today,
        }));

        let spec = model.state().filter("Date").unwrap();
        assert_eq!(spec.op(), FilterOp::Between);
        assert_eq!(spec.value(), &FilterValue::range("2024-01-15", "2024-04-15"));
        let input = model.input("Date").unwrap();
        assert_eq!((input.min.as_str(), input.max.as_str()), ("2024-01-15", "2024-04-15"));
        let months: BTreeSet<String> = model
            .view()
            .rows()
            .iter()
            .map(|&i| model.dataset().rows()[i]["Date"].to_string())
            .collect();
        assert_eq!(months.len(), 4);
    }

    #[test]
    fn sparse_columns_start_hidden_and_toggle() {
        let ds = sales();
        let state = TableState::for_dataset(&ds);
        assert!(state.is_hidden("Notes"));
        let names = |s: &TableState| -> Vec<String> {
            s.visible_columns(&ds).iter().map(|c| c.name.clone()).collect()
        };
        assert_eq!(names(&state), ["Product", "Date", "Total Sales"]);

        let state = state.reduce(&ds, TableAction::ToggleColumn("Product".into())).unwrap();
        assert_eq!(names(&state), ["Date", "Total Sales"]);
        let state = state.reduce(&ds, TableAction::ShowAllColumns).unwrap();
        assert_eq!(names(&state), ["Product", "Date", "Total Sales", "Notes"]);
    }

    #[test]
    fn apply_input_commits_typed_range() {
        let mut model = TableModel::new(sales(), TableState::default());
        let input = model.input_mut("Total Sales");
        assert_eq!(input.op, FilterOp::Equals);
        input.op = FilterOp::Between;
        input.min = "100".into();
        input.max = "190".into();
        assert!(model.apply_input("Total Sales"));
        assert_eq!(model.view().len(), 10);

        model.dispatch(TableAction::ClearFilter("Total Sales".into()));
        assert!(model.input("Total Sales").is_none());
        assert_eq!(model.view().len(), 45);
    }

    #[test]
    fn upload_response_replaces_the_table() {
        let (mut app, mock) = app();
        app.refresh_all();
        assert_eq!(mock.len(), 4);

        mock.respond(
            0,
            200,
            r#"{"data": [{"Product": "DrugA", "Discount": null}],
                "validation_summary": {"missing_discounts": 1, "total_columns": 2}}"#,
        );
        app.drain_events();
        let table = app.upload.table.as_ref().unwrap();
        assert_eq!(table.dataset().len(), 1);
        assert!(table.state().is_hidden("Discount"));
        assert_eq!(app.upload.validation.missing_discounts, 1);
        assert_eq!(app.upload.notice, None);
    }

    #[test]
    fn failed_calculation_keeps_previous_results() {
        let (mut app, mock) = app();
        app.start_calculation();
        assert_eq!(
            app.calculate.notice,
            Some(Notice::Error(
                "Please select a formula and ensure data is uploaded".into()
            ))
        );
        assert_eq!(mock.len(), 0);

        app.upload.table = Some(TableModel::new(sales(), TableState::default()));
        app.calculate.selected_formula = Some("1".into());
        app.start_calculation();
        mock.respond(
            0,
            200,
            r#"{"results": [{"Product": "Drug0", "Compliance Status": "Compliant"}],
                "summary": {"total_processed": 45, "compliant_count": 45, "formula_name": "Basic"}}"#,
        );
        app.drain_events();
        assert_eq!(app.calculate.summary.as_ref().map(|s| s.total_processed), Some(45));
        // A successful calculation refreshes the history.
        assert_eq!(mock.len(), 2);

        app.start_calculation();
        mock.respond(2, 400, r#"{"detail": [{"msg": "bad formula"}, {"msg": "unknown variable"}]}"#);
        app.drain_events();
        assert_eq!(
            app.calculate.notice,
            Some(Notice::Error("bad formula\nunknown variable".into()))
        );
        assert_eq!(app.calculate.results.as_ref().map(|t| t.dataset().len()), Some(1));
    }

    #[test]
    fn created_formula_is_listed_and_draft_reset() {
        let (mut app, mock) = app();
        app.formulas.draft.name = "Basic".into();
        app.submit_formula();
        let (method, _, body) = mock.request(0);
        assert_eq!(method, "POST");
        assert!(String::from_utf8_lossy(&body).contains(r#""name":"Basic""#));

        mock.respond(
            0,
            200,
            r#"{"id": "3", "name": "Basic", "description": "", "formula_string": "Total Sales"}"#,
        );
        app.drain_events();
        assert_eq!(app.formulas.formulas.len(), 1);
        assert_eq!(app.formulas.draft, FormulaDraft::default());
        assert!(matches!(app.formulas.notice, Some(Notice::Success(_))));
        let (method, url, _) = mock.request(1);
        assert_eq!((method.as_str(), url.as_str()), ("GET", "http://localhost:8000/api/formulas"));
    }

    #[test]
    fn list_requested_before_a_create_cannot_drop_it() {
        let (mut app, mock) = app();
        let ids = |app: &AppState| -> Vec<String> {
            app.formulas.formulas.iter().map(|f| f.id.clone()).collect()
        };
        const BASIC: &str = r#""1": {"name": "Basic", "description": "", "formula_string": "Total Sales"}"#;

        app.api.fetch_formulas();
        app.formulas.draft.name = "Markup".into();
        app.submit_formula();
        mock.respond(
            1,
            200,
            r#"{"id": "2", "name": "Markup", "description": "", "formula_string": "Total Sales * 1.1"}"#,
        );
        app.drain_events();
        assert_eq!(ids(&app), ["2"]);
        assert_eq!(mock.len(), 3);

        mock.respond(0, 200, &format!("{{{BASIC}}}"));
        app.drain_events();
        assert_eq!(ids(&app), ["2"]);

        let both = format!(
            r#"{{{BASIC}, "2": {{"name": "Markup", "description": "", "formula_string": "Total Sales * 1.1"}}}}"#
        );
        mock.respond(2, 200, &both);
        app.drain_events();
        assert_eq!(ids(&app), ["1", "2"]);
    }

    #[test]
    fn oversized_file_is_refused_before_any_request() {
        let (mut app, mock) = app();
        let dir = tempfile::tempdir().unwrap();
        let small = dir.path().join("sales.csv");
        std::fs::write(&small, b"Drug Name\nDrugA\n").unwrap();
        app.select_file(&small);
        assert!(app.upload.selected.is_some());

        let big = dir.path().join("big.csv");
        std::fs::File::create(&big)
            .unwrap()
            .set_len(11 * 1024 * 1024)
            .unwrap();
        app.select_file(&big);
        assert_eq!(
            app.upload.notice,
            Some(Notice::Error("File is too large. Maximum size is 10MB.".into()))
        );
        assert_eq!(app.upload.selected, None);

        app.start_upload();
        assert_eq!(
            app.upload.notice,
            Some(Notice::Error("Please select a file to upload".into()))
        );
        assert_eq!(mock.len(), 0);
        assert!(!app.api.is_pending(Endpoint::Upload));
    }

    #[test]
    fn rejected_quick_range_leaves_the_widget_alone() {
        let today = NaiveDate::from_ymd_opt(2024, 4, 15).unwrap();
        let mut model = TableModel::new(sales(), TableState::default());
        assert!(!model.dispatch(TableAction::QuickRange {
            column: "Total Sales".into(),
            range: QuickRange::LastMonth,
            today,
        }));
        assert!(model.input("Total Sales").is_none());
        assert!(model.state().filter("Total Sales").is_none());
        assert!(model.filter_error.is_some());
    }

    #[test]
    fn missing_variables_endpoint_keeps_defaults() {
        let (mut app, mock) = app();
        app.api.fetch_variables();
        mock.respond(0, 404, r#"{"detail": "Not Found"}"#);
        app.drain_events();
        assert_eq!(app.formulas.variables, default_variables());
        assert_eq!(app.formulas.notice, None);
    }

    #[test]
    fn stats_count_todays_calculations() {
        let record = |ts: &str, ok: u64, bad: u64| CalculationRecord {
            timestamp: ts.into(),
            formula_id: "1".into(),
            rows_processed: ok + bad,
            formula_name: None,
            compliant_count: Some(ok),
            non_compliant_count: Some(bad),
        };
        let history = [
            record("2024-04-15T09:00:00.1", 8, 2),
            record("2024-04-14T18:00:00", 5, 0),
            record("2024-04-15T11:30:00", 1, 1),
        ];
        let today = NaiveDate::from_ymd_opt(2024, 4, 15).unwrap();
        assert_eq!(
            DashboardStats::from_history(&history, today),
            DashboardStats {
                calculations_today: 2,
                compliant_prices: 14,
                non_compliant_prices: 3,
            }
        );
    }
}
