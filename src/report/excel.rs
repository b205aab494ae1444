// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::path::Path;

use chrono::Utc;
use rust_xlsxwriter::{Format, FormatAlign, Url, Workbook, Worksheet, XlsxError};

use crate::domain::models::filters::SearchCategory;
use crate::domain::models::report::AggregateReport;
use crate::domain::models::tender::Tender;

const COL_PUBLISH: u16 = 0;
const COL_END: u16 = 1;
const COL_REGION: u16 = 2;
const COL_CUSTOMER: u16 = 3;
const COL_TITLE: u16 = 4;
const COL_PRICE: u16 = 5;
const COL_FOOTER: u16 = 6;

/// Render the aggregate report into a workbook: one sheet per harvested
/// category, a section per source, fixed column layout, and a
/// generation-date footer cell.
pub fn write_workbook(report: &AggregateReport, path: &Path) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let empty: Vec<Tender> = Vec::new();

    for category in SearchCategory::ALL {
        let gov = report.zakupki_gov_ru.get(&category);
        let sber = report.sber_ast.get(&category);
        if gov.is_none() && sber.is_none() {
            continue;
        }

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(category.sheet_title())?;
        write_sheet(
            worksheet,
            gov.unwrap_or(&empty),
            sber.unwrap_or(&empty),
        )?;
    }

    workbook.save(path)?;
    Ok(())
}

fn write_sheet(
    worksheet: &mut Worksheet,
    gov_tenders: &[Tender],
    sber_tenders: &[Tender],
) -> Result<(), XlsxError> {
    write_header(worksheet)?;

    let section_format = Format::new()
        .set_bold()
        .set_font_size(18)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);

    let mut row = 1u32;
    worksheet.merge_range(row, COL_PUBLISH, row, COL_TITLE, "Zakupki.Gov.ru", &section_format)?;
    row += 1;
    row = write_tenders(worksheet, gov_tenders, row)?;

    worksheet.merge_range(row, COL_PUBLISH, row, COL_TITLE, "Сбер-АСТ", &section_format)?;
    row += 1;
    write_tenders(worksheet, sber_tenders, row)?;

    Ok(())
}

fn write_header(worksheet: &mut Worksheet) -> Result<(), XlsxError> {
    let header_format = Format::new()
        .set_bold()
        .set_font_size(12)
        .set_align(FormatAlign::Center)
        .set_text_wrap();

    worksheet.set_column_width(COL_PUBLISH, 16)?;
    worksheet.set_column_width(COL_END, 16)?;
    worksheet.set_column_width(COL_REGION, 34)?;
    worksheet.set_column_width(COL_CUSTOMER, 40)?;
    worksheet.set_column_width(COL_TITLE, 100)?;
    worksheet.set_column_width(COL_PRICE, 20)?;

    worksheet.write_string_with_format(0, COL_PUBLISH, "Дата размещения", &header_format)?;
    worksheet.write_string_with_format(0, COL_END, "Дата окончания", &header_format)?;
    worksheet.write_string_with_format(0, COL_REGION, "Расположение", &header_format)?;
    worksheet.write_string_with_format(0, COL_CUSTOMER, "Заказчик", &header_format)?;
    worksheet.write_string_with_format(0, COL_TITLE, "Объект закупки + ссылка", &header_format)?;
    worksheet.write_string_with_format(0, COL_PRICE, "Начальная цена", &header_format)?;

    let generated = Utc::now().format("%d.%m.%Y");
    worksheet.write_string(
        0,
        COL_FOOTER,
        format!("Дата создания таблицы: {}", generated),
    )?;

    Ok(())
}

fn write_tenders(
    worksheet: &mut Worksheet,
    tenders: &[Tender],
    mut row: u32,
) -> Result<u32, XlsxError> {
    for tender in tenders {
        worksheet.write_string(row, COL_PUBLISH, tender.publish_date.as_str())?;
        worksheet.write_string(row, COL_END, tender.end_date.as_str())?;
        worksheet.write_string(row, COL_REGION, tender.region.as_deref().unwrap_or(""))?;
        worksheet.write_string(row, COL_CUSTOMER, tender.customer.as_str())?;

        if tender.link.is_empty() {
            worksheet.write_string(row, COL_TITLE, tender.title.as_str())?;
        } else {
            worksheet.write_url_with_text(
                row,
                COL_TITLE,
                Url::new(tender.link.as_str()),
                tender.title.as_str(),
            )?;
        }

        worksheet.write_string(row, COL_PRICE, tender.price.as_str())?;
        row += 1;
    }
    Ok(row)
}
