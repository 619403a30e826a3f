use proptest::collection::vec;
use proptest::prelude::*;
use proptest::test_runner::{FileFailurePersistence, TestCaseResult};
use stepper_binding::{
    ElementHost, FieldSpec, FieldTable, Formatter, MemoryHost, Page, PageOptions, SlotId,
    StepValue, Stepper, parse_int,
};

const STEPPER_PROPTEST_REGRESSION_FILE: &str =
    "tests/proptest-regressions/stepper_property_test.txt";
const DEFAULT_STEPPER_PROPTEST_CASES: u32 = 256;

#[derive(Clone, Debug)]
enum StepAction {
    Increment,
    Decrement,
}

fn stepper_proptest_cases() -> u32 {
    std::env::var("STEPPER_BINDING_PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_STEPPER_PROPTEST_CASES)
}

fn formatter_strategy() -> BoxedStrategy<Formatter> {
    prop_oneof![Just(Formatter::Plain), Just(Formatter::Currency)].boxed()
}

fn step_strategy() -> BoxedStrategy<i64> {
    prop_oneof![
        Just(1i64),
        Just(1_000i64),
        Just(10_000i64),
        1i64..=1_000_000_000i64,
    ]
    .boxed()
}

fn action_sequence_strategy() -> BoxedStrategy<Vec<StepAction>> {
    vec(
        prop_oneof![Just(StepAction::Increment), Just(StepAction::Decrement)],
        0..=32,
    )
    .boxed()
}

fn bind(initial: i64, step: i64, format: Formatter) -> (MemoryHost, Stepper<SlotId>) {
    let mut host = MemoryHost::new();
    let input = host.add_slot(&initial.to_string());
    let label = host.add_slot("");
    let stepper = Stepper::new(FieldSpec::new("Field", step, format), input, label);
    (host, stepper)
}

fn stored(host: &MemoryHost, stepper: &Stepper<SlotId>) -> Result<StepValue, TestCaseError> {
    host.read_value(stepper.input())
        .map(|raw| parse_int(&raw))
        .map_err(|err| TestCaseError::fail(format!("{err:?}")))
}

fn assert_round_trip(
    initial: i64,
    step: i64,
    format: Formatter,
    up_first: bool,
) -> TestCaseResult {
    let (mut host, stepper) = bind(initial, step, format);
    let run = |host: &mut MemoryHost, up: bool| {
        if up {
            stepper.increment(host)
        } else {
            stepper.decrement(host)
        }
    };
    run(&mut host, up_first).map_err(|err| TestCaseError::fail(format!("{err:?}")))?;
    run(&mut host, !up_first).map_err(|err| TestCaseError::fail(format!("{err:?}")))?;
    let expected = initial.to_string();
    prop_assert_eq!(host.value(stepper.input()), Some(expected.as_str()));
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: stepper_proptest_cases(),
        failure_persistence: Some(Box::new(
            FileFailurePersistence::Direct(STEPPER_PROPTEST_REGRESSION_FILE),
        )),
        .. ProptestConfig::default()
    })]

    #[test]
    fn increment_then_decrement_restores_value(
        initial in any::<i64>(),
        step in step_strategy(),
        format in formatter_strategy(),
        up_first in any::<bool>(),
    ) {
        assert_round_trip(initial, step, format, up_first)?;
    }

    #[test]
    fn repeated_increments_accumulate(
        initial in -1_000_000_000i64..=1_000_000_000i64,
        step in step_strategy(),
        count in 0usize..=64,
    ) {
        let (mut host, stepper) = bind(initial, step, Formatter::Plain);
        for _ in 0..count {
            stepper
                .increment(&mut host)
                .map_err(|err| TestCaseError::fail(format!("{err:?}")))?;
        }
        let expected = i128::from(initial) + i128::from(step) * count as i128;
        prop_assert_eq!(stored(&host, &stepper)?.to_string(), expected.to_string());
    }

    #[test]
    fn label_matches_formatter_after_every_step(
        initial in any::<i32>(),
        step in step_strategy(),
        format in formatter_strategy(),
        actions in action_sequence_strategy(),
    ) {
        let (mut host, stepper) = bind(i64::from(initial), step, format);
        for action in &actions {
            let next = match action {
                StepAction::Increment => stepper.increment(&mut host),
                StepAction::Decrement => stepper.decrement(&mut host),
            }
            .map_err(|err| TestCaseError::fail(format!("{err:?}")))?;

            let expected_label = match format {
                Formatter::Plain => next.to_string(),
                Formatter::Currency => format!("${next}"),
            };
            prop_assert_eq!(host.text(stepper.label()), Some(expected_label.as_str()));
            prop_assert_eq!(stored(&host, &stepper)?, next);
        }
    }

    #[test]
    fn display_renders_exact_text(value in any::<i64>()) {
        let (mut host, stepper) = bind(0, 1, Formatter::Currency);
        stepper
            .display(&mut host, &StepValue::from(value))
            .map_err(|err| TestCaseError::fail(format!("{err:?}")))?;
        let currency = format!("${value}");
        prop_assert_eq!(host.text(stepper.label()), Some(currency.as_str()));

        let (mut host, stepper) = bind(0, 1, Formatter::Plain);
        stepper
            .display(&mut host, &StepValue::from(value))
            .map_err(|err| TestCaseError::fail(format!("{err:?}")))?;
        let plain = value.to_string();
        prop_assert_eq!(host.text(stepper.label()), Some(plain.as_str()));
    }

    #[test]
    fn parse_int_reads_the_leading_integer(
        value in any::<i64>(),
        padding in "[ \t\n]{0,3}",
        suffix in "[a-z.]{0,4}",
    ) {
        let raw = format!("{padding}{value}{suffix}");
        prop_assert_eq!(parse_int(&raw), StepValue::from(value));
    }

    #[test]
    fn page_clicks_never_panic(actions in action_sequence_strategy()) {
        let html = r#"
            <input type="range" id="Debt" value="0">
            <button id="up" onclick="add_one_Debt()">+</button>
            <button id="down" onclick="subtract_one_Debt()">-</button>
            <span id="slider_value_Debt"></span>
        "#;
        let table = FieldTable::new(vec![FieldSpec::new("Debt", 1000, Formatter::Currency)])
            .map_err(|err| TestCaseError::fail(format!("{err:?}")))?;
        let mut page = Page::from_html_with_options(html, PageOptions::default().with_fields(table))
            .map_err(|err| TestCaseError::fail(format!("{err:?}")))?;

        let mut expected = 0i64;
        for action in &actions {
            let outcome = match action {
                StepAction::Increment => {
                    expected += 1000;
                    page.click("#up")
                }
                StepAction::Decrement => {
                    expected -= 1000;
                    page.click("#down")
                }
            };
            prop_assert!(outcome.is_ok(), "click failed: {outcome:?}, actions={actions:?}");
        }
        prop_assert!(page.assert_value("#Debt", &expected.to_string()).is_ok());
        if !actions.is_empty() {
            let label = format!("${expected}");
            prop_assert_eq!(page.text("#slider_value_Debt").ok(), Some(label));
        }
    }
}
