use std::fs;
use std::path::Path;

use margin_report::ReportError;
use margin_report::chart::BarChart;
use margin_report::config::{ColumnMapping, ReportOptions};
use margin_report::export::decode_csv;
use margin_report::io::excel_read;
use margin_report::io::table::TableKind;
use margin_report::model::Category;
use margin_report::pipeline::{AnalyzeRequest, analyze_files};
use rust_xlsxwriter::Workbook;
use tempfile::tempdir;

const SALES_CSV: &str = "\
SKU,Preis,Amazon_Gebuehren,Sonstige_Gebuehren,Verkaufte_Anzahl
A1,100,10,5,3
A1,25,10,5,1
B2,55,10,5,1
C3,46,10,5,1
D4,75,10,5,1
E5,65,10,5,1
NEW1,20,1,1,4
";

const PRODUCTS_CSV: &str = "\
SKU,Produktname,Einkaufspreis
A1,Widget,30
B2,Gadget,30
C3,Doohickey,30
D4,Sprocket,30
E5,Gizmo,30
";

fn request(dir: &Path, sales: &str, products: &str) -> AnalyzeRequest {
    AnalyzeRequest {
        sales: dir.join(sales),
        products: dir.join(products),
        output: dir.join("out").join("gewinnanalyse.csv"),
        excel_output: None,
        chart_output: None,
        options: ReportOptions::default(),
    }
}

#[test]
fn csv_inputs_produce_sorted_export() {
    let temp_dir = tempdir().expect("temporary directory");
    fs::write(temp_dir.path().join("sales.csv"), SALES_CSV).expect("sales written");
    fs::write(temp_dir.path().join("products.csv"), PRODUCTS_CSV).expect("products written");

    let mut request = request(temp_dir.path(), "sales.csv", "products.csv");
    request.chart_output = Some(temp_dir.path().join("chart.json"));
    let report = analyze_files(&request).expect("report computed");

    assert_eq!(report.unmatched.iter().collect::<Vec<_>>(), vec!["NEW1"]);
    let skus: Vec<_> = report.rows.iter().map(|row| row.sku.as_str()).collect();
    assert_eq!(skus, vec!["A1", "D4", "E5", "B2", "C3"]);

    let exported = fs::read(&request.output).expect("export read");
    let text = String::from_utf8(exported.clone()).expect("utf-8 export");
    assert!(text.starts_with("SKU,Produktname,Verkaufte_Anzahl,Gewinn,Kategorie\nA1,Widget,4,145,Top-Produkt\n"));

    let decoded = decode_csv(&exported, &ColumnMapping::default()).expect("export decoded");
    assert_eq!(decoded, report.rows);

    let chart: BarChart =
        serde_json::from_str(&fs::read_to_string(temp_dir.path().join("chart.json")).unwrap())
            .expect("chart parsed");
    assert_eq!(chart.bars.len(), 5);
    assert_eq!(chart.bars[0].label, "Widget");
    assert_eq!(chart.bars[4].category, Category::Loss);
}

#[test]
fn other_fees_may_live_in_reference_table() {
    let temp_dir = tempdir().expect("temporary directory");
    fs::write(
        temp_dir.path().join("sales.csv"),
        "SKU;Preis;Amazon_Gebuehren;Verkaufte_Anzahl\nA1;100;10;3\n",
    )
    .unwrap();
    fs::write(
        temp_dir.path().join("products.csv"),
        "SKU;Produktname;Einkaufspreis;Sonstige_Gebuehren\nA1;Widget;30;5\n",
    )
    .unwrap();

    let mut request = request(temp_dir.path(), "sales.csv", "products.csv");
    request.options.delimiter = b';';
    let report = analyze_files(&request).expect("report computed");

    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].total_profit, 165.0);
    assert_eq!(report.rows[0].category, Category::Middle);
}

#[test]
fn missing_column_aborts_without_output() {
    let temp_dir = tempdir().expect("temporary directory");
    fs::write(temp_dir.path().join("sales.csv"), SALES_CSV).unwrap();
    fs::write(
        temp_dir.path().join("products.csv"),
        "SKU,Einkaufspreis\nA1,30\n",
    )
    .unwrap();

    let request = request(temp_dir.path(), "sales.csv", "products.csv");
    let err = analyze_files(&request).expect_err("missing column rejected");

    assert!(matches!(
        err,
        ReportError::MissingColumn {
            table: TableKind::Reference,
            ..
        }
    ));
    assert!(!request.output.exists());
}

#[test]
fn unwritable_excel_target_leaves_no_csv_behind() {
    let temp_dir = tempdir().expect("temporary directory");
    fs::write(temp_dir.path().join("sales.csv"), SALES_CSV).unwrap();
    fs::write(temp_dir.path().join("products.csv"), PRODUCTS_CSV).unwrap();
    let occupied = temp_dir.path().join("occupied");
    fs::create_dir(&occupied).unwrap();

    let mut request = request(temp_dir.path(), "sales.csv", "products.csv");
    request.excel_output = Some(occupied);
    let err = analyze_files(&request).expect_err("directory target rejected");

    assert!(matches!(err, ReportError::InvalidOutput(_)));
    assert!(!request.output.exists());
}

#[test]
fn failed_chart_write_removes_earlier_artifacts() {
    let temp_dir = tempdir().expect("temporary directory");
    fs::write(temp_dir.path().join("sales.csv"), SALES_CSV).unwrap();
    fs::write(temp_dir.path().join("products.csv"), PRODUCTS_CSV).unwrap();
    let blocker = temp_dir.path().join("blocker");
    fs::write(&blocker, "not a directory").unwrap();

    let mut request = request(temp_dir.path(), "sales.csv", "products.csv");
    request.excel_output = Some(temp_dir.path().join("result.xlsx"));
    request.chart_output = Some(blocker.join("chart.json"));
    let err = analyze_files(&request).expect_err("chart write fails");

    assert!(matches!(err, ReportError::Io(_)));
    assert!(!request.output.exists());
    assert!(!temp_dir.path().join("result.xlsx").exists());
}

#[test]
fn missing_input_file_is_reported() {
    let temp_dir = tempdir().expect("temporary directory");
    fs::write(temp_dir.path().join("products.csv"), PRODUCTS_CSV).unwrap();

    let request = request(temp_dir.path(), "absent.csv", "products.csv");
    let err = analyze_files(&request).expect_err("missing input rejected");
    assert!(matches!(err, ReportError::MissingInput(_)));
}

#[test]
fn empty_tables_produce_header_only_export() {
    let temp_dir = tempdir().expect("temporary directory");
    fs::write(
        temp_dir.path().join("sales.csv"),
        "SKU,Preis,Amazon_Gebuehren,Sonstige_Gebuehren,Verkaufte_Anzahl\n",
    )
    .unwrap();
    fs::write(temp_dir.path().join("products.csv"), "SKU,Produktname,Einkaufspreis\n").unwrap();

    let mut request = request(temp_dir.path(), "sales.csv", "products.csv");
    request.excel_output = Some(temp_dir.path().join("empty.xlsx"));
    let report = analyze_files(&request).expect("report computed");

    assert!(report.is_empty());
    assert_eq!(report.thresholds, None);
    assert_eq!(
        fs::read_to_string(&request.output).unwrap(),
        "SKU,Produktname,Verkaufte_Anzahl,Gewinn,Kategorie\n"
    );
    assert!(temp_dir.path().join("empty.xlsx").exists());
}

#[test]
fn excel_inputs_and_export_roundtrip() {
    let temp_dir = tempdir().expect("temporary directory");

    let mut sales = Workbook::new();
    let sheet = sales.add_worksheet();
    let headers = ["SKU", "Preis", "Amazon_Gebuehren", "Sonstige_Gebuehren", "Verkaufte_Anzahl"];
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }
    sheet.write_string(1, 0, "A1").unwrap();
    for (col, value) in [100.0, 10.0, 5.0, 3.0].iter().enumerate() {
        sheet.write_number(1, col as u16 + 1, *value).unwrap();
    }
    sales.save(temp_dir.path().join("sales.xlsx")).expect("sales workbook saved");

    let mut products = Workbook::new();
    let sheet = products.add_worksheet();
    for (col, header) in ["SKU", "Produktname", "Einkaufspreis"].iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }
    sheet.write_string(1, 0, "A1").unwrap();
    sheet.write_string(1, 1, "Widget").unwrap();
    sheet.write_number(1, 2, 30.0).unwrap();
    products.save(temp_dir.path().join("products.xlsx")).expect("products workbook saved");

    let mut request = request(temp_dir.path(), "sales.xlsx", "products.xlsx");
    let xlsx_path = temp_dir.path().join("result.xlsx");
    request.excel_output = Some(xlsx_path.clone());
    let report = analyze_files(&request).expect("report computed");
    assert_eq!(report.rows[0].total_profit, 165.0);
    assert_eq!(report.rows[0].total_units, 3);

    let exported = excel_read::read_table(&xlsx_path, TableKind::Sales).expect("export read");
    assert_eq!(
        exported.headers,
        vec!["SKU", "Produktname", "Verkaufte_Anzahl", "Gewinn", "Kategorie"]
    );
    assert_eq!(exported.rows, vec![vec!["A1", "Widget", "3", "165", "Mittel"]]);
}
