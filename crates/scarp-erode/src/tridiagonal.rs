//! Tridiagonal line solvers for the ADI sweeps.

/// Solve `A x = d` for a tridiagonal `A` by the Thomas algorithm.
///
/// `sub`, `diag`, `sup` are the three bands (`sub[0]` and `sup[n-1]`
/// unused); the solution overwrites `d`. `scratch` must be at least as
/// long as `d`.
pub(crate) fn solve_thomas(
    sub: &[f64],
    diag: &[f64],
    sup: &[f64],
    d: &mut [f64],
    scratch: &mut [f64],
) {
    let n = d.len();
    debug_assert!(n > 0 && diag[0] != 0.0);
    scratch[0] = sup[0] / diag[0];
    d[0] /= diag[0];
    for i in 1..n {
        let m = diag[i] - sub[i] * scratch[i - 1];
        scratch[i] = sup[i] / m;
        d[i] = (d[i] - sub[i] * d[i - 1]) / m;
    }
    for i in (0..n - 1).rev() {
        d[i] -= scratch[i] * d[i + 1];
    }
}

/// Solve a tridiagonal system with corner entries
/// `A[0][n-1] = corner_first` and `A[n-1][0] = corner_last` (a periodic
/// line) by the Sherman-Morrison correction.
///
/// Falls back to the plain Thomas solve when both corners are zero.
/// `scratch` and `z` must be at least as long as `d`; `work_diag` holds
/// the modified diagonal.
#[allow(clippy::too_many_arguments)]
pub(crate) fn solve_cyclic(
    sub: &[f64],
    diag: &[f64],
    sup: &[f64],
    corner_first: f64,
    corner_last: f64,
    d: &mut [f64],
    scratch: &mut [f64],
    z: &mut [f64],
    work_diag: &mut [f64],
) {
    let n = d.len();
    if corner_first == 0.0 && corner_last == 0.0 {
        solve_thomas(sub, diag, sup, d, scratch);
        return;
    }
    debug_assert!(n >= 3, "cyclic line needs at least 3 nodes");

    // A = A' + u v^T with u = (gamma, 0, .., corner_last),
    // v = (1, 0, .., corner_first / gamma).
    let gamma = -diag[0];
    work_diag.copy_from_slice(&diag[..n]);
    work_diag[0] = diag[0] - gamma;
    work_diag[n - 1] = diag[n - 1] - corner_first * corner_last / gamma;

    solve_thomas(sub, work_diag, sup, d, scratch);

    z[..n].iter_mut().for_each(|v| *v = 0.0);
    z[0] = gamma;
    z[n - 1] = corner_last;
    solve_thomas(sub, work_diag, sup, &mut z[..n], scratch);

    let ratio = corner_first / gamma;
    let fact = (d[0] + ratio * d[n - 1]) / (1.0 + z[0] + ratio * z[n - 1]);
    for i in 0..n {
        d[i] -= fact * z[i];
    }
}
