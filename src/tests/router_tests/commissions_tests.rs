use crate::domain::sale::fixtures::{client, sale};
use crate::domain::SaleStatus;
use crate::router::handle;
use crate::tests::utils::{body_string, get, TestApp};

fn seed_sales(app: &TestApp) {
    app.crm.add_client(&client("c1", "João Araújo", "123.456.789-00")).unwrap();
    app.crm.add_client(&client("c2", "Marta Lima", "987.654.321-00")).unwrap();

    let mut own = sale("s1", "c1", "broker-1", "2024-03-05");
    own.lot_number = "17".into();
    app.crm.add_sale(&own).unwrap();

    let mut other = sale("s2", "c2", "broker-2", "2023-08-20");
    other.total_value = 200_000.0;
    other.commission_value = 8_000.0;
    other.status = SaleStatus::WaitingInvoice;
    app.crm.add_sale(&other).unwrap();
}

#[test]
fn brokers_see_only_their_commissions() {
    let app = TestApp::new();
    seed_sales(&app);
    let cookie = app.cookie_for("broker-1");

    let resp = handle(get("/commissions", Some(&cookie)), &app.state).unwrap();

    assert_eq!(resp.status(), 200);
    let body = body_string(resp);
    assert!(body.contains("My commissions"));
    assert!(body.contains("João Araújo"));
    assert!(!body.contains("Marta Lima"));
    assert!(body.contains("R$ 5.000,00"));
    assert!(body.contains("Jardim Europa"));
}

#[test]
fn admin_totals_follow_the_filters() {
    let app = TestApp::new();
    seed_sales(&app);
    let cookie = app.cookie_for("admin");

    let all = body_string(handle(get("/commissions", Some(&cookie)), &app.state).unwrap());
    assert!(all.contains("R$ 300.000,00"));
    assert!(all.contains("R$ 13.000,00"));

    let req = get("/commissions?year=2023&status=waiting_invoice", Some(&cookie));
    let filtered = body_string(handle(req, &app.state).unwrap());
    assert!(filtered.contains("Marta Lima"));
    assert!(!filtered.contains("João Araújo"));
    assert!(filtered.contains("R$ 8.000,00"));

    let req = get("/commissions?team=team-a", Some(&cookie));
    let team_a = body_string(handle(req, &app.state).unwrap());
    assert!(team_a.contains("João Araújo"));
    assert!(!team_a.contains("Marta Lima"));
}

#[test]
fn search_matches_buyer_without_accents_and_lot() {
    let app = TestApp::new();
    seed_sales(&app);
    let cookie = app.cookie_for("admin");

    let req = get("/commissions?q=joao+araujo", Some(&cookie));
    let by_name = body_string(handle(req, &app.state).unwrap());
    assert!(by_name.contains("João Araújo"));
    assert!(!by_name.contains("Marta Lima"));

    let req = get("/commissions?q=987.654", Some(&cookie));
    let by_cpf = body_string(handle(req, &app.state).unwrap());
    assert!(by_cpf.contains("Marta Lima"));
    assert!(!by_cpf.contains("João Araújo"));
}

#[test]
fn empty_sales_show_a_message() {
    let app = TestApp::new();
    let cookie = app.cookie_for("leader");

    let body = body_string(handle(get("/commissions", Some(&cookie)), &app.state).unwrap());

    assert!(body.contains("Team commissions"));
    assert!(body.contains("No commissions found."));
}
