use crate::error::{Error, Result};
use crate::models::record::Record;
use crate::utils::time::to_ru_display;
use rust_xlsxwriter::*;

pub const CSV_FILE_NAME: &str = "journal_dostupa.csv";
pub const XLSX_FILE_NAME: &str = "journal_dostupa.xlsx";

const BOM: &str = "\u{FEFF}";

const HEADERS: [(&str, f64); 12] = [
    ("№ п/п", 8.0),
    ("Ф.И.О., должность, email, телефон контактного лица", 36.0),
    ("Наименование стороннего пользователя (организации)", 28.0),
    ("ФИО, должность, email, телефон стороннего пользователя", 36.0),
    ("Сведения об объекте подключения", 28.0),
    ("Виды выполняемых работ", 28.0),
    ("Тип доступа (локальный/удаленный)", 16.0),
    ("Срок предоставления доступа", 22.0),
    ("Фактическое время подключения/отключения", 24.0),
    ("Куратор", 20.0),
    ("Исполнитель", 20.0),
    ("Примечание", 30.0),
];

pub struct ExportService;

impl ExportService {
    fn stacked(parts: &[Option<&str>]) -> String {
        parts
            .iter()
            .map(|p| p.unwrap_or(""))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Cell text for one journal row, in header order. Grouped columns put
    /// each part on its own line.
    pub fn journal_row(index: usize, r: &Record) -> [String; 12] {
        let window = format!(
            "{}\n{}",
            to_ru_display(r.access_start_date),
            r.access_end_date
                .map(to_ru_display)
                .unwrap_or_else(|| "не указано".to_string())
        );
        let actual = format!(
            "{}\n{}",
            r.actual_connection_date
                .map(to_ru_display)
                .unwrap_or_else(|| "не подключено".to_string()),
            r.actual_disconnection_date
                .map(to_ru_display)
                .unwrap_or_else(|| "не отключено".to_string())
        );

        [
            (index + 1).to_string(),
            Self::stacked(&[
                Some(r.user_full_name.as_str()),
                r.position.as_deref(),
                r.email.as_deref(),
                r.phone.as_deref(),
            ]),
            r.organization_name.clone().unwrap_or_default(),
            Self::stacked(&[
                r.external_user_name.as_deref(),
                r.external_user_position.as_deref(),
                r.external_user_email.as_deref(),
                r.external_user_phone.as_deref(),
            ]),
            r.object_name.clone(),
            r.work_types.clone().unwrap_or_default(),
            r.access_type.clone(),
            window,
            actual,
            r.curator.clone().unwrap_or_default(),
            r.executor.clone().unwrap_or_default(),
            r.notes.clone().unwrap_or_default(),
        ]
    }

    fn quote(cell: &str) -> String {
        format!("\"{}\"", cell.replace('"', "\"\""))
    }

    /// Semicolon-separated, CRLF rows, UTF-8 with BOM. The row number is
    /// the only unquoted column.
    pub fn generate_records_csv(records: &[Record]) -> Result<Vec<u8>> {
        if records.is_empty() {
            return Err(Error::BadRequest("Нет данных для выгрузки".to_string()));
        }

        let mut lines = Vec::with_capacity(records.len() + 1);
        lines.push(
            HEADERS
                .iter()
                .map(|(name, _)| *name)
                .collect::<Vec<_>>()
                .join(";"),
        );
        for (idx, record) in records.iter().enumerate() {
            let cells = Self::journal_row(idx, record);
            let mut row = Vec::with_capacity(cells.len());
            for (col, cell) in cells.iter().enumerate() {
                if col == 0 {
                    row.push(cell.clone());
                } else {
                    row.push(Self::quote(cell));
                }
            }
            lines.push(row.join(";"));
        }

        let mut out = String::from(BOM);
        out.push_str(&lines.join("\r\n"));
        Ok(out.into_bytes())
    }

    /// Same columns as the CSV, as a styled workbook.
    pub fn generate_records_xlsx(records: &[Record]) -> Result<Vec<u8>> {
        if records.is_empty() {
            return Err(Error::BadRequest("Нет данных для выгрузки".to_string()));
        }

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Журнал доступа")?;

        let primary_color = Color::RGB(0x1E293B);
        let header_bg = Color::RGB(0x0F172A);
        let alt_row = Color::RGB(0xF8FAFC);
        let border_color = Color::RGB(0xE2E8F0);

        for (i, (_, width)) in HEADERS.iter().enumerate() {
            worksheet.set_column_width(i as u16, *width)?;
        }

        let title_format = Format::new()
            .set_font_size(16)
            .set_bold()
            .set_font_color(Color::White)
            .set_background_color(primary_color)
            .set_align(FormatAlign::CenterAcross)
            .set_align(FormatAlign::VerticalCenter);
        worksheet.set_row_height(0, 36)?;
        worksheet.merge_range(0, 0, 0, (HEADERS.len() - 1) as u16, "Журнал доступа", &title_format)?;

        let header_format = Format::new()
            .set_bold()
            .set_font_size(10)
            .set_font_color(Color::White)
            .set_background_color(header_bg)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_text_wrap()
            .set_border(FormatBorder::Thin)
            .set_border_color(border_color);

        let header_row = 1;
        worksheet.set_row_height(header_row, 48)?;
        for (i, (name, _)) in HEADERS.iter().enumerate() {
            worksheet.write_string_with_format(header_row, i as u16, *name, &header_format)?;
        }

        let data_start_row = 2;
        for (idx, record) in records.iter().enumerate() {
            let row = data_start_row + idx as u32;
            let bg = if idx % 2 == 0 { alt_row } else { Color::White };
            let cell_fmt = Format::new()
                .set_font_size(10)
                .set_background_color(bg)
                .set_align(FormatAlign::Top)
                .set_text_wrap()
                .set_border(FormatBorder::Thin)
                .set_border_color(border_color);
            let number_fmt = cell_fmt.clone().set_align(FormatAlign::Center);

            worksheet.write_number_with_format(row, 0, (idx + 1) as f64, &number_fmt)?;
            let cells = Self::journal_row(idx, record);
            for (col, cell) in cells.iter().enumerate().skip(1) {
                worksheet.write_string_with_format(row, col as u16, cell, &cell_fmt)?;
            }
        }

        worksheet.set_freeze_panes(2, 0)?;
        worksheet.autofilter(
            header_row,
            0,
            data_start_row + records.len() as u32 - 1,
            (HEADERS.len() - 1) as u16,
        )?;

        let buffer = workbook.save_to_buffer()?;
        Ok(buffer)
    }
}
