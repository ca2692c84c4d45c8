// crates/al_solver/tests/kernel_properties.rs

//! 诱导速度核的性质测试
//!
//! 覆盖核函数的解析性质：方向反转对称性、正则化有界性与
//! 远场一致性、退化几何安全性，以及闭式解与经典解析结果的对照。

use al_solver::kernel::vortex::induced_velocity_segment;
use al_solver::kernel::{CoreModel, Vorton};
use glam::DVec3;
use std::f64::consts::PI;

const CORE: f64 = 0.08;

/// 伪随机点序列（测试可复现）
fn sample_points(n: usize) -> Vec<DVec3> {
    let mut state = 0x2545F4914F6CDD1Du64;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        (state >> 11) as f64 / (1u64 << 53) as f64 * 4.0 - 2.0
    };
    (0..n)
        .map(|_| DVec3::new(next(), next(), next()))
        .collect()
}

#[test]
fn filament_direction_reversal_symmetry() {
    // A→B 环量 Γ 与 B→A 环量 −Γ 必须给出相同的诱导速度
    let points = sample_points(30);
    for chunk in points.chunks(3) {
        let [a, b, c] = [chunk[0], chunk[1], chunk[2]];
        for model in CoreModel::ALL {
            let v_ab = induced_velocity_segment(a, b, 2.3, c, model, CORE);
            let v_ba = induced_velocity_segment(b, a, -2.3, c, model, CORE);
            assert!(
                (v_ab - v_ba).length() < 1e-13,
                "{model}: asymmetric at {c:?}"
            );
        }
    }
}

#[test]
fn regularization_bounded_and_converges_to_potential() {
    // 长直涡线：r=0 处有限；正则化/无正则化之比随 r 单调不减，
    // r ≫ core 时在 1% 内收敛到无正则化值
    let a = DVec3::new(-100.0, 0.0, 0.0);
    let b = DVec3::new(100.0, 0.0, 0.0);

    for model in CoreModel::ALL {
        let v0 = induced_velocity_segment(a, b, 1.0, DVec3::ZERO, model, CORE);
        assert!(v0.is_finite(), "{model}: not finite on the axis");

        let mut prev_ratio = 0.0;
        for i in 1..=80 {
            let r = i as f64 * 0.1 * CORE;
            let point = DVec3::new(0.0, r, 0.0);
            let damped = induced_velocity_segment(a, b, 1.0, point, model, CORE).length();
            let potential =
                induced_velocity_segment(a, b, 1.0, point, CoreModel::Potential, CORE).length();
            let ratio = damped / potential;
            assert!(
                ratio >= prev_ratio - 1e-9,
                "{model}: damping ratio not monotone at r={r}"
            );
            prev_ratio = ratio;
        }
        // 远场：12 倍涡核处与无正则化值相差 <1%
        let far = DVec3::new(0.0, 12.0 * CORE, 0.0);
        let damped = induced_velocity_segment(a, b, 1.0, far, model, CORE).length();
        let potential =
            induced_velocity_segment(a, b, 1.0, far, CoreModel::Potential, CORE).length();
        assert!(
            (damped / potential - 1.0).abs() < 0.01,
            "{model}: far field deviates by more than 1%"
        );
    }
}

#[test]
fn collinear_configuration_exactly_zero() {
    // A、B、C 共线：叉积退化，必须精确为零，不得出现除零
    let a = DVec3::new(1.0, 2.0, 3.0);
    let dir = DVec3::new(0.3, -0.5, 0.8);
    let b = a + dir * 2.0;
    for t in [-1.5, -0.1, 0.5, 1.1, 3.0] {
        let c = a + dir * (2.0 * t);
        for model in CoreModel::ALL {
            let v = induced_velocity_segment(a, b, 1.0, c, model, CORE);
            assert_eq!(v, DVec3::ZERO, "{model}: nonzero on the axis at t={t}");
        }
    }
}

#[test]
fn square_ring_center_matches_analytic() {
    // 边长 a 的方形涡环中心速度解析解: |v| = 2√2·Γ/(π·a)
    let side = 1.0;
    let gamma = 1.0;
    let corners = [
        DVec3::new(0.0, 0.0, 0.0),
        DVec3::new(side, 0.0, 0.0),
        DVec3::new(side, side, 0.0),
        DVec3::new(0.0, side, 0.0),
    ];
    let center = DVec3::new(0.5, 0.5, 0.0);

    let mut v = DVec3::ZERO;
    for k in 0..4 {
        v += induced_velocity_segment(
            corners[k],
            corners[(k + 1) % 4],
            gamma,
            center,
            CoreModel::Potential,
            1e-3,
        );
    }
    let expected = 2.0 * 2f64.sqrt() * gamma / (PI * side);
    assert!((v.length() - expected).abs() / expected < 1e-12);
    // 四段同向绕行，速度沿环法向
    assert!(v.x.abs() < 1e-14 && v.y.abs() < 1e-14);
}

#[test]
fn vorton_mollified_kernel_properties() {
    let vorton = Vorton::new(DVec3::ZERO, DVec3::Z * 2.0, 1e-4);
    assert!((vorton.circulation() - 2.0).abs() < 1e-15);

    // 处处有界
    for i in 0..200 {
        let r = i as f64 * 0.01;
        let v = vorton.induced_velocity(DVec3::new(r, 0.0, 0.0), CORE);
        assert!(v.is_finite());
    }

    // 远场退化为奇异点涡核
    let point = DVec3::new(3.0, 0.0, 0.0);
    let v = vorton.induced_velocity(point, CORE);
    let k = -point / point.length().powi(3);
    let exact = k.cross(DVec3::Z * 2.0) / (4.0 * PI);
    assert!((v - exact).length() / exact.length() < 1e-4);
}

#[test]
fn vorton_superposition_linearity() {
    // 诱导速度对涡量线性
    let p = DVec3::new(0.7, -0.4, 1.1);
    let single = Vorton::new(DVec3::ZERO, DVec3::new(1.0, 2.0, -0.5), 1e-4);
    let double = Vorton::new(DVec3::ZERO, DVec3::new(2.0, 4.0, -1.0), 1e-4);
    let v1 = single.induced_velocity(p, CORE);
    let v2 = double.induced_velocity(p, CORE);
    assert!((v2 - v1 * 2.0).length() < 1e-14);
}
