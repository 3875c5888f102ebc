#![no_main]

use libfuzzer_sys::fuzz_target;

use hexarith::{
    FixedFormat, FixedPoint, FloatValue, FloatingPoint, Operator, RoundingPolicy, HALF, SINGLE,
};

const OPERATORS: [Operator; 4] = [Operator::Add, Operator::Sub, Operator::Mul, Operator::Div];

fn native(op: Operator, lhs: f32, rhs: f32) -> f32 {
    match op {
        Operator::Add => lhs + rhs,
        Operator::Sub => lhs - rhs,
        Operator::Mul => lhs * rhs,
        Operator::Div => lhs / rhs,
    }
}

fuzz_target!(|data: (u32, u32, u8, u8, u8, u8)| {
    let (lhs, rhs, policy, op, integer_bits, fractional_bits) = data;
    let Some(policy) = RoundingPolicy::from_digit(policy % 4) else {
        return;
    };
    let op = OPERATORS[(op % 4) as usize];

    for format in [&SINGLE, &HALF] {
        let engine = FloatingPoint::new(format, policy);
        let a = FloatValue::from_bits(format, lhs);
        let b = FloatValue::from_bits(format, rhs);

        // every non-NaN pattern survives a decode/encode cycle
        let mask = u32::MAX >> (32 - format.bits);
        if !a.is_nan() {
            assert_eq!(a.to_bits(), lhs & mask);
        }

        let result = engine.apply(a, Some((op, b)));
        let _ = result.render();

        if format == &SINGLE && policy == RoundingPolicy::NearestEven {
            let expected = native(op, f32::from_bits(lhs), f32::from_bits(rhs));
            if expected.is_nan() {
                assert!(result.is_nan());
            } else {
                assert_eq!(
                    result.to_bits(),
                    expected.to_bits(),
                    "{:#x} {:?} {:#x}",
                    lhs,
                    op,
                    rhs
                );
            }
        }
    }

    let Ok(format) = FixedFormat::new(u32::from(integer_bits % 33), u32::from(fractional_bits % 33))
    else {
        return;
    };
    let engine = FixedPoint::new(format, policy);
    let (a, b) = (format.wrap(lhs.into()), format.wrap(rhs.into()));
    if let Ok(result) = engine.apply(a, Some((op, b))) {
        assert_eq!(result, format.wrap(result.into()));
        let _ = engine.render(result);
    }
});
