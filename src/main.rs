use dispatch_sim::callbacks::JsonTraceCallback;
use dispatch_sim::config::{
    BrkgaConfig, CKMeansConfig, Config, DispatchPolicyKind, RouteAlgo, StrategyConfig,
};
use dispatch_sim::model::{Delivery, DeliveryId, Point, VehicleId};
use dispatch_sim::simulation::Simulator;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config {
        strategy: StrategyConfig::TwoStage {
            clustering_algo: dispatch_sim::config::ClusterAlgo::GreedySequential,
            routing_algo: RouteAlgo::Brkga,
        },
        dispatch_policy: DispatchPolicyKind::Jit,
        decision_interval_minutes: 1,
        brkga: BrkgaConfig::default(),
        ckmeans: CKMeansConfig::default(),
        optimizer_deadline_s: 5.0,
        speed: 0.1,
    };

    let depot = Point::new(0.0, 0.0);
    let mut sim = Simulator::new(config, depot)?;
    sim.add_callback(Box::new(JsonTraceCallback::new("demo")));

    sim.register_vehicle(VehicleId(1), 10);
    sim.register_vehicle(VehicleId(2), 10);

    sim.submit_order(Delivery::new(
        DeliveryId::from("d1"),
        Point::new(1.0, 0.0),
        3,
        0.0,
        60.0,
        sim.clock(),
    ));
    sim.submit_order(Delivery::new(
        DeliveryId::from("d2"),
        Point::new(-2.0, 1.0),
        4,
        5.0,
        90.0,
        sim.clock(),
    ));

    sim.advance_time(200);

    let monitor = sim.monitor();
    tracing::info!(
        delivered = monitor.delivered,
        late = monitor.late,
        total_penalty = monitor.total_penalty,
        total_duration = monitor.total_duration,
        infeasible = monitor.infeasible,
        "simulation complete"
    );

    Ok(())
}
