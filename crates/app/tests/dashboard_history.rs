mod common;

use chrono::{Duration, TimeZone, Utc};

use almox_app::{AppError, HistoryFilter};
use almox_inventory::{ExpiryStatus, NewEntry, NewExit, NewItem};
use almox_reports::ExportError;

use common::{date, harness};

fn item(nome: &str, codigo: &str, quantidade: f64, validade: Option<chrono::NaiveDate>) -> NewItem {
    NewItem {
        nome: nome.to_string(),
        codigo: Some(codigo.to_string()),
        quantidade: Some(quantidade),
        validade,
        ..NewItem::default()
    }
}

fn exit(codigo: &str, quantidade: f64, setor: &str) -> NewExit {
    NewExit {
        codigo: Some(codigo.to_string()),
        quantidade: Some(quantidade),
        setor_destino: Some(setor.to_string()),
        ..NewExit::default()
    }
}

#[tokio::test]
async fn dashboard_flags_low_stock_and_expiry() {
    let (h, _) = harness();
    let admin = h.admin().await;

    // Today is 2024-06-10 (local).
    admin
        .create_item(item("Dipirona", "DIP", 3.0, Some(date(2024, 6, 1))))
        .await
        .unwrap();
    admin
        .create_item(item("Soro fisiológico", "SORO", 40.0, Some(date(2024, 6, 25))))
        .await
        .unwrap();
    admin
        .create_item(item("Papel A4", "PAP", 50.0, None))
        .await
        .unwrap();
    let mut detergente = item("Detergente", "DET", 12.0, Some(date(2025, 6, 1)));
    detergente.estoque_minimo = Some(20.0);
    admin.create_item(detergente).await.unwrap();

    let dashboard = admin.dashboard().await.unwrap();

    assert_eq!(dashboard.summary.total_items, 4);
    assert_eq!(dashboard.summary.total_units, 105.0);
    assert_eq!(dashboard.summary.low_stock, 2);
    assert_eq!(dashboard.summary.expired, 1);
    assert_eq!(dashboard.summary.expiring, 1);

    let low: Vec<&str> = dashboard.low_stock.iter().map(|i| i.nome.as_str()).collect();
    assert_eq!(low, vec!["Dipirona", "Detergente"]);

    assert_eq!(dashboard.expiring.len(), 2);
    assert_eq!(dashboard.expiring[0].nome, "Dipirona");
    assert_eq!(dashboard.expiring[0].status, ExpiryStatus::Expired);
    assert_eq!(dashboard.expiring[0].status.to_string(), "VENCIDO");
    assert_eq!(dashboard.expiring[1].codigo.as_deref(), Some("SORO"));
    assert_eq!(dashboard.expiring[1].status, ExpiryStatus::ExpiresIn(14));

    // Four seed entries, all recorded today.
    assert_eq!(dashboard.entries_today, 4);
    assert_eq!(dashboard.exits_today, 0);
}

#[tokio::test]
async fn todays_counts_follow_the_local_day() {
    let (h, _) = harness();
    let admin = h.admin().await;
    admin
        .create_item(item("Café", "CAF", 30.0, None))
        .await
        .unwrap();
    admin.record_exit(exit("CAF", 1.0, "Gabinete")).await.unwrap();

    // 23:30 local on the same day is 02:30 UTC the next day.
    h.clock.set(Utc.with_ymd_and_hms(2024, 6, 11, 2, 30, 0).unwrap());
    admin.record_exit(exit("CAF", 1.0, "Gabinete")).await.unwrap();
    let same_day = admin.dashboard().await.unwrap();
    assert_eq!(same_day.exits_today, 2);

    h.clock.advance(Duration::hours(1));
    let next_day = admin.dashboard().await.unwrap();
    assert_eq!(next_day.entries_today, 0);
    assert_eq!(next_day.exits_today, 0);
}

#[tokio::test]
async fn history_is_newest_first_and_filterable() {
    let (h, _) = harness();
    let admin = h.admin().await;
    admin
        .create_item(item("Água sanitária", "AGU-1", 40.0, None))
        .await
        .unwrap();
    admin
        .create_item(item("Sabão em pó", "SAB-2", 40.0, None))
        .await
        .unwrap();

    admin.record_exit(exit("AGU-1", 2.0, "Secretaria de Saúde")).await.unwrap();
    h.clock.advance(Duration::days(1));
    admin.record_exit(exit("SAB-2", 3.0, "Escola Municipal")).await.unwrap();
    h.clock.advance(Duration::hours(2));
    admin.record_exit(exit("AGU-1", 1.0, "UBS Saúde da Família")).await.unwrap();

    let all = admin.exit_history(&HistoryFilter::default()).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].setor_destino, "UBS Saúde da Família");
    assert_eq!(all[2].setor_destino, "Secretaria de Saúde");

    let agua = admin
        .exit_history(&HistoryFilter {
            codigo: Some("agu".to_string()),
            ..HistoryFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(agua.len(), 2);

    let saude_next_day = admin
        .exit_history(&HistoryFilter {
            setor: Some("saúde".to_string()),
            dia: Some(date(2024, 6, 11)),
            ..HistoryFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(saude_next_day.len(), 1);
    assert_eq!(saude_next_day[0].quantidade, 1.0);

    let entries_first_day = admin
        .entry_history(&HistoryFilter {
            dia: Some(date(2024, 6, 10)),
            ..HistoryFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(entries_first_day.len(), 2);
}

#[tokio::test]
async fn exports_write_csv_and_refuse_empty_results() {
    let (h, _) = harness();
    let admin = h.admin().await;
    let dir = tempfile::tempdir().unwrap();

    let empty = admin
        .export_exits(&HistoryFilter::default(), dir.path().join("saidas.csv"))
        .await
        .unwrap_err();
    assert!(matches!(empty, AppError::Export(ExportError::Empty)));
    assert_eq!(empty.user_message(), "Não há dados para exportar.");
    assert!(!dir.path().join("saidas.csv").exists());

    admin
        .create_item(item("Clipes", "CLI", 10.0, Some(date(2026, 1, 1))))
        .await
        .unwrap();
    admin
        .record_entry(NewEntry {
            codigo: Some("CLI".to_string()),
            quantidade: Some(5.0),
            fornecedor: Some("Papelaria Central".to_string()),
            ..NewEntry::default()
        })
        .await
        .unwrap();
    admin.record_exit(exit("CLI", 12.0, "Protocolo")).await.unwrap();

    let written = admin
        .export_exits(&HistoryFilter::default(), dir.path().join("saidas.csv"))
        .await
        .unwrap();
    assert_eq!(written, 1);
    let csv = std::fs::read_to_string(dir.path().join("saidas.csv")).unwrap();
    assert!(csv.contains("Setor Destino"));
    assert!(csv.contains("\"Validade 01/01/2026: 10\nSem validade: 2\""));
    assert!(csv.contains("10/06/2024 10:00"));

    assert_eq!(
        admin
            .export_entries(&HistoryFilter::default(), dir.path().join("entradas.csv"))
            .await
            .unwrap(),
        2
    );
    assert_eq!(admin.export_inventory(dir.path().join("itens.csv")).await.unwrap(), 1);
}
