//! Example: The Document Translation architecture overview
//!
//! This example demonstrates the scope API on a realistic topology:
//! 1. Opening a diagram and nested clusters with explicit guards
//! 2. Declaring typed nodes with multi-line labels
//! 3. Chaining edges with `forward` and `reverse`
//! 4. Writing the DOT description (and a PNG when Graphviz is installed)

use trellis::{
    Cluster, Diagram, Endpoint, Node, TrellisError,
    config::DiagramConfig,
    style::OutputFormat,
};

fn main() -> Result<(), TrellisError> {
    let mut formats = vec![OutputFormat::Dot];
    if std::env::args().any(|arg| arg == "--png") {
        formats.push(OutputFormat::Png);
    }

    let config = DiagramConfig::new("Overview")
        .with_filename("overview")
        .with_formats(formats)
        .with_graph_attr("fontsize", "20");
    let diagram = Diagram::enter(config);

    // Shared
    let shared = Cluster::enter("Shared")?;
    let client = Node::of_kind("aws.general.Client", "Client")?;

    let auth = Cluster::enter("Auth")?;
    let cognito = Node::of_kind("aws.security.Cognito", "Cognito\n(User Auth)")?;
    let idp = Node::of_kind(
        "azure.identity.ActiveDirectory",
        "Identity Provider\n(Azure AD/SAML 2.0)",
    )?;
    auth.exit()?;

    let api = Cluster::enter("API")?;
    let waf = Node::of_kind("aws.security.WAF", "WAF\n(Firewall)")?;
    let appsync = Node::of_kind("aws.mobile.Appsync", "AppSync\n(GraphQL API)")?;
    api.exit()?;

    let hosting = Cluster::enter("Web hosting")?;
    let cache = Node::of_kind("aws.network.CloudFront", "CloudFront\n(Web Cache)")?;
    let site = Node::of_kind("aws.storage.S3", "S3 Bucket\n(Static Web)")?;
    hosting.exit()?;
    shared.exit()?;

    cache.reverse(&site)?;
    client.reverse(&cache)?;
    waf.forward(&appsync)?;
    client.forward(&waf)?;
    client.forward(&cognito)?.forward(&idp)?;

    // Help
    let help = Cluster::enter("Help Info")?;
    let help_table = Node::of_kind("aws.database.DDB", "DynamoDB\n(Help Info)")?;
    help.exit()?;
    appsync.forward(&help_table)?;

    // Document translation
    let translation = Cluster::enter("Document Translation")?;
    let documents = Node::of_kind("aws.storage.S3", "S3 Bucket\n(User Documents)")?;
    let jobs = Node::of_kind("aws.database.DDB", "DynamoDB\n(Job History)")?;
    let workflows = Node::of_kind("aws.integration.SF", "Step Functions\n(Workflows)")?;
    let translate = Node::of_kind("aws.ml.Translate", "Translate\n(Translation)")?;
    let macie = Node::of_kind("aws.security.Macie", "Macie\n(PII Detection)")?;
    translation.exit()?;

    appsync.forward(&jobs)?.forward(&workflows)?;
    client.forward(&documents)?.reverse(&workflows)?;
    workflows.forward(&[macie, translate])?;

    // Simply readable
    let readable = Cluster::enter("Simply Readable")?;
    let images = Node::of_kind("aws.storage.S3", "S3 Bucket\n(Generated Images)")?;
    let readable_jobs = Node::of_kind("aws.database.DDB", "DynamoDB\n(Job History)")?;
    let models = Node::of_kind("aws.database.DDB", "DynamoDB\n(Model Definitions)")?;
    let readable_workflows = Node::of_kind("aws.integration.SF", "Step Functions\n(Workflows)")?;
    let bedrock = Node::of_kind("aws.general.SDK", "Bedrock\n(Generative AI)")?;
    readable.exit()?;

    appsync.forward(&readable_jobs)?.forward(&readable_workflows)?;
    appsync.reverse(&models)?.forward(&readable_workflows)?;
    client.forward(&images)?.reverse(&readable_workflows)?;
    readable_workflows.forward(&bedrock)?;

    let output = diagram.exit()?;

    println!(
        "{} nodes, {} clusters, {} edges",
        output.diagram().nodes().count(),
        output.diagram().clusters().count(),
        output.diagram().edges().len()
    );
    for artifact in output.artifacts() {
        println!("Written: {}", artifact.display());
    }

    Ok(())
}
