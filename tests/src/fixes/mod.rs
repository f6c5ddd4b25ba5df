mod idempotence;
mod roles;
mod scenarios;
mod shapes;
mod soundness;
