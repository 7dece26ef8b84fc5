use erp_shared::form::{FormStatus, SubmitTarget};
use erp_shared::resources::{ContactDraft, ContactKind, Contacts, Currency, QuoteDraft, Quotes};
use erp_shared::testing::{json_response, ScreenTester};
use erp_shared::{ClientConfig, Editable, FormEvent, MutationForm};
use serde_json::json;

fn mounted_form<R: Editable>() -> ScreenTester<MutationForm<R>> {
    let mut app = ScreenTester::new();
    app.send(FormEvent::Mounted(
        ClientConfig::new("https://erp.example.com/api")
            .unwrap()
            .with_auth_token("t0k3n"),
    ));
    app
}

#[test]
fn quote_with_zero_amount_never_reaches_the_server() {
    let mut app = mounted_form::<Quotes>();
    let drained = app.send(FormEvent::Submit {
        draft: QuoteDraft {
            customer_id: Some(8),
            amount: 0.0,
            currency: Some(Currency::Try),
            note: Some("Kış lastiği".into()),
        },
        target: SubmitTarget::Create,
    });

    assert!(drained.fetches.is_empty());
    assert_eq!(
        app.view().field_errors.get("amount"),
        Some("Tutar 0'dan büyük olmalıdır.")
    );
}

#[test]
fn corrected_quote_submits_with_auth_header() {
    let mut app = mounted_form::<Quotes>();
    let mut draft = QuoteDraft {
        customer_id: Some(8),
        amount: 0.0,
        currency: Some(Currency::Try),
        note: None,
    };
    app.send(FormEvent::Submit {
        draft: draft.clone(),
        target: SubmitTarget::Create,
    });
    app.send(FormEvent::FieldEdited {
        field: "amount".into(),
    });
    assert!(app.view().field_errors.is_empty());

    draft.amount = 2400.0;
    let drained = app.send(FormEvent::Submit {
        draft,
        target: SubmitTarget::Create,
    });
    let request = drained.requests()[0].clone();
    assert_eq!(request.headers().get("Authorization"), Some("Bearer t0k3n"));
    assert_eq!(request.headers().get("Content-Type"), Some("application/json"));
    let body: serde_json::Value = serde_json::from_slice(request.body().unwrap()).unwrap();
    assert_eq!(body["amount"], json!(2400.0));
    assert_eq!(body["currency"], json!("TRY"));
}

#[test]
fn contact_update_reports_server_side_errors() {
    let mut app = mounted_form::<Contacts>();
    let drained = app.send(FormEvent::Submit {
        draft: ContactDraft {
            name: "Mehmet Kaya".into(),
            phone: Some("0532 000 00 00".into()),
            email: Some("mehmet@example.com".into()),
            kind: Some(ContactKind::Employee),
        },
        target: SubmitTarget::Update(31),
    });
    assert_eq!(drained.requests()[0].url().path(), "/api/contacts/31");

    let fetch = drained.fetches.into_iter().next().unwrap();
    app.resolve(
        fetch,
        json_response(
            422,
            &json!({"errors": {"email": ["Bu e-posta adresi zaten kayıtlı."]}}),
        ),
    );

    let view = app.view();
    assert_eq!(view.status, FormStatus::Editing);
    assert_eq!(view.error, None);
    assert_eq!(
        view.field_errors.get("email"),
        Some("Bu e-posta adresi zaten kayıtlı.")
    );
}
